//! 随应用打包的静态灵修内容：晨昏念词（Adkar）、古兰经经文、圣训
//!
//! 数据以 JSON 形式嵌入二进制（rust-embed），首次访问时解析并缓存。

use std::sync::OnceLock;

use rust_embed::Embed;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, EnumIter, EnumString};
use tracing::error;

use crate::errors::{Result, SalatError};

#[derive(Embed)]
#[folder = "assets/content/"]
struct ContentAssets;

/// Adkar 分类
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdkarCategory {
    Morning,
    Evening,
    General,
}

impl AdkarCategory {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Morning => "Morning Adkar",
            Self::Evening => "Evening Adkar",
            Self::General => "General Adkar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adkar {
    pub id: u32,
    pub text: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    pub category: AdkarCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuranVerse {
    pub id: u32,
    pub surah: u32,
    pub ayah: u32,
    pub arabic_text: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hadith {
    pub text: String,
    pub translation: String,
    pub reference: String,
}

/// 已解析的内容库
#[derive(Debug, Default)]
pub struct ContentLibrary {
    adkar: Vec<Adkar>,
    verses: Vec<QuranVerse>,
    hadiths: Vec<Hadith>,
}

static LIBRARY: OnceLock<ContentLibrary> = OnceLock::new();

/// 获取内置内容库（首次调用时解析嵌入的 JSON）
pub fn library() -> &'static ContentLibrary {
    LIBRARY.get_or_init(|| match ContentLibrary::load_embedded() {
        Ok(lib) => lib,
        Err(e) => {
            error!("Failed to load bundled devotional content: {}", e);
            ContentLibrary::default()
        }
    })
}

/// 随机选取一项，允许重复
fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(rand::random_range(0..items.len()))
}

fn load_asset<T: DeserializeOwned>(name: &str) -> Result<Vec<T>> {
    let file = ContentAssets::get(name)
        .ok_or_else(|| SalatError::file_operation(format!("Missing bundled asset: {}", name)))?;
    Ok(serde_json::from_slice(&file.data)?)
}

impl ContentLibrary {
    pub fn load_embedded() -> Result<Self> {
        Ok(Self {
            adkar: load_asset("adkar.json")?,
            verses: load_asset("quran.json")?,
            hadiths: load_asset("hadith.json")?,
        })
    }

    pub fn new(adkar: Vec<Adkar>, verses: Vec<QuranVerse>, hadiths: Vec<Hadith>) -> Self {
        Self {
            adkar,
            verses,
            hadiths,
        }
    }

    pub fn all_adkar(&self) -> &[Adkar] {
        &self.adkar
    }

    pub fn adkar_by_category(&self, category: AdkarCategory) -> Vec<&Adkar> {
        self.adkar.iter().filter(|a| a.category == category).collect()
    }

    pub fn random_adkar(&self) -> Option<&Adkar> {
        pick(&self.adkar)
    }

    pub fn verses(&self) -> &[QuranVerse] {
        &self.verses
    }

    pub fn random_verse(&self) -> Option<&QuranVerse> {
        pick(&self.verses)
    }

    pub fn verses_by_surah(&self, surah: u32) -> Vec<&QuranVerse> {
        self.verses.iter().filter(|v| v.surah == surah).collect()
    }

    pub fn verse_by_id(&self, id: u32) -> Option<&QuranVerse> {
        self.verses.iter().find(|v| v.id == id)
    }

    pub fn hadiths(&self) -> &[Hadith] {
        &self.hadiths
    }

    pub fn random_hadith(&self) -> Option<&Hadith> {
        pick(&self.hadiths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_embedded_content_loads() {
        let lib = ContentLibrary::load_embedded().expect("bundled content should parse");
        assert_eq!(lib.all_adkar().len(), 10);
        assert_eq!(lib.verses().len(), 10);
        assert_eq!(lib.hadiths().len(), 3);
    }

    #[test]
    fn test_every_category_has_entries() {
        let lib = library();
        for category in AdkarCategory::iter() {
            let items = lib.adkar_by_category(category);
            assert!(!items.is_empty(), "{} has no adkar", category.as_ref());
            assert!(items.iter().all(|a| a.category == category));
        }
    }

    #[test]
    fn test_verse_lookups() {
        let lib = library();
        let baqarah = lib.verses_by_surah(2);
        assert!(baqarah.iter().all(|v| v.surah == 2));
        assert_eq!(baqarah.len(), 3);

        let first = lib.verse_by_id(1).unwrap();
        assert_eq!(first.reference, "Surah Al-Fatihah 1:1");
        assert!(lib.verse_by_id(999).is_none());
    }

    #[test]
    fn test_random_picks_come_from_library() {
        let lib = library();
        for _ in 0..20 {
            let a = lib.random_adkar().unwrap();
            assert!(lib.all_adkar().contains(a));
            let v = lib.random_verse().unwrap();
            assert!(lib.verses().contains(v));
            assert!(lib.random_hadith().is_some());
        }
    }

    #[test]
    fn test_empty_library_returns_none() {
        let lib = ContentLibrary::default();
        assert!(lib.random_adkar().is_none());
        assert!(lib.random_verse().is_none());
        assert!(lib.random_hadith().is_none());
    }

    #[test]
    fn test_category_parse() {
        use std::str::FromStr;
        assert_eq!(AdkarCategory::from_str("morning").unwrap(), AdkarCategory::Morning);
        assert!(AdkarCategory::from_str("night").is_err());
        assert_eq!(AdkarCategory::Evening.title(), "Evening Adkar");
    }
}
