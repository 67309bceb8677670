//! Plain-text rendering of artifacts and account details.

use relicveil_core::utils::{format_likes, truncate_string};
use relicveil_core::{Artifact, ProfileStats, Reaction, User};

/// Width of the name column in listings
const NAME_WIDTH: usize = 32;

/// Width of the type column in listings
const TYPE_WIDTH: usize = 16;

pub fn print_artifacts(artifacts: &[Artifact]) {
    if artifacts.is_empty() {
        println!("No artifacts found.");
        return;
    }

    println!(
        "{:<26} {:<name_w$} {:<type_w$} {}",
        "ID",
        "NAME",
        "TYPE",
        "LIKES",
        name_w = NAME_WIDTH,
        type_w = TYPE_WIDTH
    );
    for a in artifacts {
        println!(
            "{:<26} {:<name_w$} {:<type_w$} {}",
            a.id,
            truncate_string(&a.name, NAME_WIDTH),
            truncate_string(&a.artifact_type, TYPE_WIDTH),
            a.display_likes(),
            name_w = NAME_WIDTH,
            type_w = TYPE_WIDTH
        );
    }
    println!("\n{} artifact(s)", artifacts.len());
}

pub fn print_artifact(a: &Artifact, reaction: Reaction) {
    println!("{}", a.name);
    println!("{}", "=".repeat(a.name.chars().count().max(3)));
    field("Type", &a.artifact_type);
    field("Image", &a.image);
    field("Created", &a.created_at);
    field("Discovered", &a.discovered_at);
    field("Discovered by", &a.discovered_by);
    field("Location", &a.present_location);
    field("Added by", &format!("{} <{}>", a.adder_name, a.adder_email));

    let status = match reaction {
        Reaction::Liked => " (you liked this)",
        Reaction::Disliked => " (you disliked this)",
        Reaction::None => "",
    };
    println!("{:>14}: {}{}", "Likes", format_likes(a.display_likes()), status);

    if !a.historical_context.is_empty() {
        println!("\nHistorical context:\n  {}", a.historical_context);
    }
    if !a.description.is_empty() {
        println!("\nDescription:\n  {}", a.description);
    }
}

pub fn print_user(user: &User, stats: Option<ProfileStats>) {
    field("Name", user.display_name_or_email());
    field("Email", &user.email);
    if let Some(ref photo) = user.photo_url {
        field("Photo", photo);
    }
    field("Signed in", &user.signed_in_at.format("%b %d, %Y %H:%M UTC").to_string());
    if let Some(stats) = stats {
        field("Added", &stats.total_added.to_string());
        field("Liked", &stats.total_liked.to_string());
    }
}

fn field(label: &str, value: &str) {
    if !value.trim().is_empty() {
        println!("{:>14}: {}", label, value);
    }
}
