//! Static car image catalog.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// One of the nine body styles a card can show.
///
/// Serialized with the Japanese label the client displays; the ASCII slug is
/// accepted too and is what image ids are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CarCategory {
    #[serde(rename = "クロスカントリー", alias = "crosscountry")]
    CrossCountry,
    #[serde(rename = "SUV", alias = "suv")]
    Suv,
    #[serde(rename = "軽自動車", alias = "kei")]
    Kei,
    #[serde(rename = "ミニバン", alias = "minivan")]
    Minivan,
    #[serde(rename = "ワンボックス", alias = "onebox")]
    OneBox,
    #[serde(rename = "コンパクト", alias = "compact")]
    Compact,
    #[serde(rename = "セダン", alias = "sedan")]
    Sedan,
    #[serde(rename = "ステーションワゴン", alias = "wagon")]
    StationWagon,
    #[serde(rename = "クーペ", alias = "coupe")]
    Coupe,
}

impl CarCategory {
    pub const ALL: [CarCategory; 9] = [
        CarCategory::CrossCountry,
        CarCategory::Suv,
        CarCategory::Kei,
        CarCategory::Minivan,
        CarCategory::OneBox,
        CarCategory::Compact,
        CarCategory::Sedan,
        CarCategory::StationWagon,
        CarCategory::Coupe,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CarCategory::CrossCountry => "クロスカントリー",
            CarCategory::Suv => "SUV",
            CarCategory::Kei => "軽自動車",
            CarCategory::Minivan => "ミニバン",
            CarCategory::OneBox => "ワンボックス",
            CarCategory::Compact => "コンパクト",
            CarCategory::Sedan => "セダン",
            CarCategory::StationWagon => "ステーションワゴン",
            CarCategory::Coupe => "クーペ",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            CarCategory::CrossCountry => "crosscountry",
            CarCategory::Suv => "suv",
            CarCategory::Kei => "kei",
            CarCategory::Minivan => "minivan",
            CarCategory::OneBox => "onebox",
            CarCategory::Compact => "compact",
            CarCategory::Sedan => "sedan",
            CarCategory::StationWagon => "wagon",
            CarCategory::Coupe => "coupe",
        }
    }
}

impl fmt::Display for CarCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CarCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarCategory::ALL
            .into_iter()
            .find(|c| c.label() == s || c.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::Other("UnknownCategory".into()),
                    format!("Unknown car category: {s}"),
                )
            })
    }
}

/// An entry of the static image database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarImage {
    pub id: String,
    pub file_name: String,
    pub category: CarCategory,
}

impl CarImage {
    pub fn image_url(&self) -> String {
        format!("/images/cars/{}", self.file_name)
    }
}

/// A dealt card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: String,
    pub image_url: String,
    pub category: CarCategory,
}

pub const IMAGES_PER_CATEGORY: usize = 6;

static CATALOG: once_cell::sync::Lazy<Vec<CarImage>> = once_cell::sync::Lazy::new(|| {
    CarCategory::ALL
        .into_iter()
        .flat_map(|category| {
            (1..=IMAGES_PER_CATEGORY).map(move |n| CarImage {
                id: format!("{}_{n:03}", category.slug()),
                file_name: format!("{}{n}.png", category.slug()),
                category,
            })
        })
        .collect()
});

/// Every image, grouped by category in [`CarCategory::ALL`] order.
pub fn all_images() -> &'static [CarImage] {
    &CATALOG
}

pub fn images_by_category(category: CarCategory) -> impl Iterator<Item = &'static CarImage> {
    CATALOG.iter().filter(move |img| img.category == category)
}

/// Uniformly pick an image of `category`; `None` if the category has none.
pub fn random_image<R: Rng + ?Sized>(category: CarCategory, rng: &mut R) -> Option<&'static CarImage> {
    let images: Vec<&'static CarImage> = images_by_category(category).collect();
    images.choose(rng).copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: CarCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_images: usize,
    pub per_category: Vec<CategoryCount>,
}

pub fn catalog_stats() -> CatalogStats {
    CatalogStats {
        total_images: CATALOG.len(),
        per_category: CarCategory::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                count: images_by_category(category).count(),
            })
            .collect(),
    }
}
