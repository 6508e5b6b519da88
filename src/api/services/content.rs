//! 灵修内容端点 `/content`

use std::str::FromStr;

use actix_web::{Responder, web};
use serde::Serialize;

use crate::content::{self, Adkar, AdkarCategory};
use crate::errors::{Result, SalatError};

use super::helpers::{api_result, success_response};

#[derive(Debug, Serialize)]
pub struct AdkarGroup<'a> {
    pub category: AdkarCategory,
    pub title: &'static str,
    pub items: Vec<&'a Adkar>,
}

fn some_or_not_found<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| SalatError::not_found(format!("No {} available", what)))
}

pub async fn list_adkar() -> impl Responder {
    success_response(content::library().all_adkar())
}

pub async fn random_adkar() -> impl Responder {
    api_result(some_or_not_found(content::library().random_adkar(), "adkar"))
}

pub async fn adkar_by_category(path: web::Path<String>) -> impl Responder {
    let raw = path.into_inner();
    let result = AdkarCategory::from_str(&raw.to_lowercase())
        .map_err(|_| SalatError::validation(format!("Unknown adkar category: {}", raw)))
        .map(|category| AdkarGroup {
            category,
            title: category.title(),
            items: content::library().adkar_by_category(category),
        });
    api_result(result)
}

pub async fn list_verses() -> impl Responder {
    success_response(content::library().verses())
}

pub async fn random_verse() -> impl Responder {
    api_result(some_or_not_found(content::library().random_verse(), "verses"))
}

pub async fn verses_by_surah(path: web::Path<u32>) -> impl Responder {
    let surah = path.into_inner();
    let verses = content::library().verses_by_surah(surah);
    if verses.is_empty() {
        return api_result::<()>(Err(SalatError::not_found(format!(
            "No verses bundled for surah {}",
            surah
        ))));
    }
    success_response(verses)
}

pub async fn verse_by_id(path: web::Path<u32>) -> impl Responder {
    let id = path.into_inner();
    api_result(
        content::library()
            .verse_by_id(id)
            .ok_or_else(|| SalatError::not_found(format!("Verse {} not found", id))),
    )
}

pub async fn list_hadiths() -> impl Responder {
    success_response(content::library().hadiths())
}

pub async fn random_hadith() -> impl Responder {
    api_result(some_or_not_found(content::library().random_hadith(), "hadith"))
}

/// 内容路由 `/content`
pub fn content_routes() -> actix_web::Scope {
    web::scope("/content")
        .route("/adkar", web::get().to(list_adkar))
        .route("/adkar/random", web::get().to(random_adkar))
        .route("/adkar/{category}", web::get().to(adkar_by_category))
        .route("/quran", web::get().to(list_verses))
        .route("/quran/random", web::get().to(random_verse))
        .route("/quran/surah/{surah}", web::get().to(verses_by_surah))
        .route("/quran/{id}", web::get().to(verse_by_id))
        .route("/hadith", web::get().to(list_hadiths))
        .route("/hadith/random", web::get().to(random_hadith))
}
