//! Location commands

use colored::Colorize;

use super::helpers::{auto_locate, info_line};
use crate::interfaces::cli::CliError;
use crate::services::AppServices;

pub async fn search_cities(services: &AppServices, query: &str) -> Result<(), CliError> {
    let suggestions = services.location.search(query).await?;

    if suggestions.is_empty() {
        info_line(&format!("No cities found for '{}'", query));
        return Ok(());
    }

    println!("{}", "Matching cities:".bold().green());
    for s in &suggestions {
        println!(
            "  {} {} {}",
            s.name.cyan(),
            format!("({:.4}, {:.4})", s.coordinates.latitude, s.coordinates.longitude).dimmed(),
            s.display_name.dimmed()
        );
    }
    Ok(())
}

pub async fn locate(services: &AppServices) -> Result<(), CliError> {
    println!("{}", "Locating by IP address...".yellow());
    let location = auto_locate(services).await;

    println!("{} {}", "City:".bold(), location.city.green());
    match location.coordinates {
        Some(c) => println!(
            "{} {:.6}, {:.6}",
            "Coordinates:".bold(),
            c.latitude,
            c.longitude
        ),
        None => println!("{} {}", "Coordinates:".bold(), "unknown".dimmed()),
    }
    if location.error.is_some() {
        let fallback = services.location.fallback();
        info_line(&format!("Using fallback location {}", fallback.city));
    }
    Ok(())
}
