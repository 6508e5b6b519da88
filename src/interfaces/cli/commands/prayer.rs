//! Prayer time commands

use colored::Colorize;

use super::helpers::{info_line, print_json, resolve_coordinates, resolve_query};
use crate::cli::PlaceArgs;
use crate::interfaces::cli::CliError;
use crate::prayer::format_prayer_time;
use crate::prayer::schedule::elapsed_since;
use crate::services::{AppServices, PrayerQuery};

fn describe(query: &PrayerQuery) -> String {
    match query {
        PrayerQuery::Coordinates(c) => format!("{:.4}, {:.4}", c.latitude, c.longitude),
        PrayerQuery::City(city) => city.clone(),
    }
}

pub async fn prayer_times(
    services: &AppServices,
    place: &PlaceArgs,
    json: bool,
) -> Result<(), CliError> {
    let query = resolve_query(services, place).await?;
    let day = services.prayer.prayer_day(&query).await?;

    if json {
        return print_json(&day);
    }

    println!(
        "{} {}",
        format!("Prayer times for {}", describe(&query)).bold().green(),
        format!("({})", day.date).dimmed()
    );
    println!();

    let current = day.status.current.as_ref().map(|c| c.prayer.name);
    for prayer in &day.prayers {
        let marker = if Some(prayer.name) == current {
            "▶".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {} {:<8} {:>8}  {}",
            marker,
            prayer.name.to_string().cyan(),
            format_prayer_time(prayer.time),
            prayer.arabic_name.dimmed()
        );
    }

    println!();
    let next = &day.status.next;
    if !next.is_unknown() {
        info_line(&format!(
            "Next: {} in {}",
            next.name.bold(),
            next.time_left.yellow()
        ));
    }
    Ok(())
}

pub async fn next_prayer(services: &AppServices, place: &PlaceArgs) -> Result<(), CliError> {
    let query = resolve_query(services, place).await?;
    let day = services.prayer.prayer_day(&query).await?;
    let now = services.prayer.clock_for(&query).await.time();

    if let Some(current) = &day.status.current {
        let since = elapsed_since(current, now);
        let suffix = if current.is_yesterday {
            " (since yesterday)"
        } else {
            ""
        };
        println!(
            "{} {} {}{}",
            "Current:".bold(),
            current.prayer.name.to_string().cyan(),
            format!("started {} ago", since).dimmed(),
            suffix.dimmed()
        );
    }

    let next = &day.status.next;
    if next.is_unknown() {
        info_line("No upcoming prayer available");
        return Ok(());
    }

    let when = next.time.as_deref().unwrap_or("--:--");
    let tomorrow = if next.is_tomorrow { " tomorrow" } else { "" };
    println!(
        "{} {} {} at {}{} ({} left)",
        "Next:".bold(),
        next.name.green().bold(),
        next.arabic_name.dimmed(),
        when,
        tomorrow,
        next.time_left.yellow()
    );
    Ok(())
}

pub async fn weekly_times(
    services: &AppServices,
    place: &PlaceArgs,
    json: bool,
) -> Result<(), CliError> {
    let (label, coords) = resolve_coordinates(services, place).await?;
    let today = services
        .prayer
        .clock_for(&PrayerQuery::Coordinates(coords))
        .await
        .date();
    let week = services.prayer.weekly(coords, today).await?;

    if json {
        return print_json(&week);
    }

    println!("{}", format!("Weekly prayer times for {}", label).bold().green());
    println!();
    println!(
        "  {:<18} {:>6} {:>7} {:>6} {:>6} {:>7} {:>6}",
        "Date".bold(),
        "Fajr".bold(),
        "Sunrise".bold(),
        "Dhuhr".bold(),
        "Asr".bold(),
        "Maghrib".bold(),
        "Isha".bold()
    );
    for row in &week {
        println!(
            "  {:<18} {:>6} {:>7} {:>6} {:>6} {:>7} {:>6}",
            row.date.cyan(),
            row.fajr,
            row.sunrise,
            row.dhuhr,
            row.asr,
            row.maghrib,
            row.isha
        );
    }
    Ok(())
}

pub async fn show_timezone(services: &AppServices, place: &PlaceArgs) -> Result<(), CliError> {
    let (label, coords) = resolve_coordinates(services, place).await?;
    let info = services.prayer.timezone(coords).await;

    if info.is_empty() {
        info_line("Timezone information is unavailable right now");
        return Ok(());
    }

    println!("{} {}", "Location:".bold(), label.cyan());
    println!("{} {}", "Timezone:".bold(), info.timezone.green());
    println!("{} {}", "Offset:".bold(), info.gmt_offset.yellow());
    println!("{} {}", "Local time:".bold(), info.local_time.dimmed());
    Ok(())
}
