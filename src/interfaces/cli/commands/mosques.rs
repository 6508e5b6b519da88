//! Mosque search and routing commands

use std::str::FromStr;

use colored::Colorize;

use super::helpers::{info_line, print_json, resolve_coordinates};
use crate::cli::PlaceArgs;
use crate::geo::{Coordinates, format_distance};
use crate::interfaces::cli::CliError;
use crate::providers::TravelMode;
use crate::services::{AppServices, FetchState};

pub async fn show_mosques(
    services: &AppServices,
    place: &PlaceArgs,
    json: bool,
) -> Result<(), CliError> {
    let (label, center) = resolve_coordinates(services, place).await?;
    let state = services.mosques.search(center).await;

    if json {
        return print_json(&state);
    }

    match state {
        FetchState::Ready(mosques) => {
            println!(
                "{}",
                format!(
                    "Mosques within {} of {}:",
                    format_distance(f64::from(services.mosques.radius_m())),
                    label
                )
                .bold()
                .green()
            );
            println!();
            for m in &mosques {
                let mut parts = vec![
                    m.mosque.name.cyan().to_string(),
                    format!("[{}]", m.distance_label).yellow().to_string(),
                ];
                if let Some(address) = &m.mosque.address {
                    parts.push(address.dimmed().to_string());
                }
                println!("  {}", parts.join(" "));
                println!(
                    "    {}",
                    format!(
                        "{:.6}, {:.6}",
                        m.mosque.coordinates.latitude, m.mosque.coordinates.longitude
                    )
                    .dimmed()
                );
            }
            println!();
            info_line(&format!("Total {} mosques", mosques.len().to_string().green()));
            Ok(())
        }
        FetchState::Empty(message) => {
            info_line(&message);
            Ok(())
        }
        FetchState::Failed(message) => Err(CliError::ServiceError(message)),
        FetchState::Idle | FetchState::Loading => Ok(()),
    }
}

pub async fn show_route(
    services: &AppServices,
    to_lat: f64,
    to_lon: f64,
    mode: &str,
    from: &PlaceArgs,
    steps: bool,
) -> Result<(), CliError> {
    let mode = mode.trim();
    let label = TravelMode::from_str(mode).map_or(mode, |known| known.label());
    let to = Coordinates::validated(to_lat, to_lon)?;
    let (place, origin) = resolve_coordinates(services, from).await?;

    println!(
        "{} {} {}",
        "Routing".yellow(),
        label.bold(),
        format!("from {}", place).dimmed()
    );

    match services.mosques.route_named(mode, origin, to).await {
        FetchState::Ready(view) => {
            println!(
                "{} {} km, {} min",
                "Route:".bold().green(),
                view.summary.distance_km.cyan(),
                view.summary.duration_min.to_string().cyan()
            );
            if steps {
                println!();
                for (i, step) in view.route.steps.iter().enumerate() {
                    let name = step
                        .name
                        .as_deref()
                        .map(|n| format!(" ({})", n))
                        .unwrap_or_default();
                    println!(
                        "  {:>2}. {}{} {}",
                        i + 1,
                        step.instruction,
                        name.dimmed(),
                        format_distance(step.distance_m).yellow()
                    );
                }
            }
            Ok(())
        }
        FetchState::Empty(message) => {
            info_line(&message);
            Ok(())
        }
        FetchState::Failed(message) => Err(CliError::ServiceError(message)),
        FetchState::Idle | FetchState::Loading => Ok(()),
    }
}
