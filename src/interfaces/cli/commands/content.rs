//! Devotional content commands

use std::str::FromStr;

use colored::Colorize;

use super::helpers::info_line;
use crate::content::{self, Adkar, AdkarCategory, QuranVerse};
use crate::interfaces::cli::CliError;

fn print_adkar(adkar: &Adkar) {
    println!("  {}", adkar.text.bold());
    if let Some(t) = &adkar.transliteration {
        println!("  {}", t.italic().dimmed());
    }
    println!("  {}", adkar.translation);
    if let Some(reference) = &adkar.reference {
        println!("  {}", reference.dimmed());
    }
    println!();
}

fn print_verse(verse: &QuranVerse) {
    println!("  {}", verse.arabic_text.bold());
    if let Some(t) = &verse.transliteration {
        println!("  {}", t.italic().dimmed());
    }
    println!("  {}", verse.translation);
    println!("  {}", verse.reference.cyan());
    println!();
}

pub fn show_adkar(category: Option<&str>) -> Result<(), CliError> {
    let library = content::library();

    let Some(raw) = category else {
        return match library.random_adkar() {
            Some(adkar) => {
                println!("{}", adkar.category.title().bold().green());
                print_adkar(adkar);
                Ok(())
            }
            None => Err(CliError::CommandError("No adkar bundled".to_string())),
        };
    };

    let category = AdkarCategory::from_str(&raw.to_lowercase()).map_err(|_| {
        CliError::ParseError(format!(
            "Unknown category '{}', expected morning, evening or general",
            raw
        ))
    })?;
    println!("{}", category.title().bold().green());
    println!();
    for adkar in library.adkar_by_category(category) {
        print_adkar(adkar);
    }
    Ok(())
}

pub fn show_quran(id: Option<u32>, surah: Option<u32>) -> Result<(), CliError> {
    let library = content::library();

    if let Some(id) = id {
        let verse = library
            .verse_by_id(id)
            .ok_or_else(|| CliError::CommandError(format!("Verse {} not found", id)))?;
        print_verse(verse);
        return Ok(());
    }

    if let Some(surah) = surah {
        let verses = library.verses_by_surah(surah);
        if verses.is_empty() {
            info_line(&format!("No verses bundled for surah {}", surah));
        }
        for verse in verses {
            print_verse(verse);
        }
        return Ok(());
    }

    let verse = library
        .random_verse()
        .ok_or_else(|| CliError::CommandError("No verses bundled".to_string()))?;
    print_verse(verse);
    Ok(())
}

pub fn random_hadith() -> Result<(), CliError> {
    let hadith = content::library()
        .random_hadith()
        .ok_or_else(|| CliError::CommandError("No hadith bundled".to_string()))?;
    println!("  {}", hadith.text.bold());
    println!("  {}", hadith.translation);
    println!("  {}", hadith.reference.dimmed());
    Ok(())
}
