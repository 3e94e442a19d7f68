use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::service::{ServiceCategory, ServiceId, ServiceLineItem};
use crate::errors::DomainError;

/// Largest one-time or recurring price accepted for a single item.
pub const MAX_ITEM_PRICE: i64 = 1_000_000_000;

/// Immutable, validated list of purchasable line items.
///
/// Item order is the display order; every derived view (selected items,
/// totals iteration) follows it so results never depend on selection order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<ServiceLineItem>,
    default_base_package: ServiceId,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    default_base_package: ServiceId,
    items: Vec<ServiceLineItem>,
}

impl Catalog {
    pub fn new(
        items: Vec<ServiceLineItem>,
        default_base_package: ServiceId,
    ) -> Result<Self, DomainError> {
        validate_items(&items, &default_base_package)?;
        Ok(Self { items, default_base_package })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document = toml::from_str::<CatalogDocument>(raw)?;
        Ok(Self::new(document.items, document.default_base_package)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// The agency's published price list.
    pub fn standard() -> Self {
        Self { items: standard_items(), default_base_package: ServiceId::new("landing-page") }
    }

    pub fn items(&self) -> &[ServiceLineItem] {
        &self.items
    }

    pub fn items_by_category(
        &self,
        category: ServiceCategory,
    ) -> impl Iterator<Item = &ServiceLineItem> + '_ {
        self.items.iter().filter(move |item| item.category == category)
    }

    pub fn item_by_id(&self, id: &ServiceId) -> Option<&ServiceLineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn require(&self, id: &ServiceId) -> Result<&ServiceLineItem, DomainError> {
        self.item_by_id(id).ok_or_else(|| DomainError::InvalidItemReference { id: id.clone() })
    }

    pub fn default_base_package(&self) -> &ServiceId {
        &self.default_base_package
    }
}

fn validate_items(
    items: &[ServiceLineItem],
    default_base_package: &ServiceId,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    let max_price = Decimal::from(MAX_ITEM_PRICE);

    for item in items {
        let id = item.id.as_str();
        if id.trim().is_empty() {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog item `{}` has a blank id",
                item.title
            )));
        }
        if id.trim() != id {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog id `{id}` has leading or trailing whitespace"
            )));
        }
        if !seen.insert(id.to_string()) {
            return Err(DomainError::CatalogInvariant(format!("duplicate catalog id `{id}`")));
        }
        if item.price_one_time < Decimal::ZERO {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog item `{id}` has a negative one-time price"
            )));
        }
        if item.price_recurring.is_some_and(|price| price < Decimal::ZERO) {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog item `{id}` has a negative recurring price"
            )));
        }
        if item.price_one_time > max_price
            || item.price_recurring.is_some_and(|price| price > max_price)
        {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog item `{id}` has a price above {MAX_ITEM_PRICE}"
            )));
        }
        if !item.is_priced() {
            return Err(DomainError::CatalogInvariant(format!(
                "catalog item `{id}` needs a one-time price above zero or a recurring price"
            )));
        }
    }

    let default_item = items.iter().find(|item| &item.id == default_base_package).ok_or_else(|| {
        DomainError::CatalogInvariant(format!(
            "default base package `{default_base_package}` is not in the catalog"
        ))
    })?;
    if default_item.category != ServiceCategory::BasePackage {
        return Err(DomainError::CatalogInvariant(format!(
            "default base package `{default_base_package}` is in category {}",
            default_item.category.as_str()
        )));
    }

    Ok(())
}

fn item(
    id: &str,
    category: ServiceCategory,
    title: &str,
    price_one_time: i64,
    price_recurring: Option<i64>,
    duration_days: u32,
    description: &str,
) -> ServiceLineItem {
    ServiceLineItem {
        id: ServiceId::new(id),
        category,
        title: title.to_string(),
        description: description.to_string(),
        price_one_time: Decimal::new(price_one_time, 0),
        price_recurring: price_recurring.map(|price| Decimal::new(price, 0)),
        duration_days,
    }
}

fn standard_items() -> Vec<ServiceLineItem> {
    use ServiceCategory::*;

    vec![
        item(
            "landing-page",
            BasePackage,
            "Landing Page \"Fast Start\"",
            150,
            None,
            3,
            "1 page, 5-7 blocks, mobile version, contact form.",
        ),
        item(
            "corporate-website",
            BasePackage,
            "Business Website",
            250,
            None,
            7,
            "Up to 5 pages (Home, Services, About, Contacts), admin panel.",
        ),
        item(
            "hosting-setup",
            Technical,
            "Launch & Hosting",
            50,
            None,
            1,
            "Domain purchase, hosting setup, SSL, corporate email.",
        ),
        item(
            "multilingual",
            AddOn,
            "Multilingual (RU/RO)",
            80,
            None,
            2,
            "Language switcher implementation + content addition.",
        ),
        item(
            "google-maps",
            AddOn,
            "Google Maps Business",
            40,
            None,
            1,
            "Map point registration, verification, design.",
        ),
        item("logo-express", AddOn, "Logo (Express)", 50, None, 2, "Text logo + favicon (site icon)."),
        item(
            "crm-telegram",
            AddOn,
            "CRM/Telegram Integration",
            30,
            None,
            1,
            "Site requests sent directly to Telegram or CRM.",
        ),
        item(
            "tech-support",
            Support,
            "Technical Support",
            0,
            Some(20),
            0,
            "Monitoring, backups, minor edits (text/photo).",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Catalog, CatalogError};
    use crate::domain::service::{ServiceCategory, ServiceId};
    use crate::errors::DomainError;

    #[test]
    fn standard_catalog_passes_validation() {
        let standard = Catalog::standard();
        let revalidated =
            Catalog::new(standard.items().to_vec(), standard.default_base_package().clone())
                .expect("standard catalog should be well formed");

        assert_eq!(revalidated, standard);
        assert_eq!(standard.items_by_category(ServiceCategory::BasePackage).count(), 2);
        assert_eq!(standard.items_by_category(ServiceCategory::AddOn).count(), 4);
    }

    #[test]
    fn lookup_by_id_returns_catalog_item() {
        let catalog = Catalog::standard();
        let item = catalog.item_by_id(&ServiceId::new("tech-support")).expect("known id");

        assert_eq!(item.price_recurring, Some(Decimal::new(20, 0)));
        assert!(catalog.item_by_id(&ServiceId::new("missing")).is_none());
        assert!(matches!(
            catalog.require(&ServiceId::new("missing")),
            Err(DomainError::InvalidItemReference { .. })
        ));
    }

    #[test]
    fn rejects_unpriced_items() {
        let mut items = Catalog::standard().items().to_vec();
        items[2].price_one_time = Decimal::ZERO;

        let error = Catalog::new(items, ServiceId::new("landing-page")).expect_err("unpriced");
        assert!(matches!(error, DomainError::CatalogInvariant(ref m) if m.contains("hosting-setup")));
    }

    #[test]
    fn rejects_duplicate_ids_and_non_base_default() {
        let mut items = Catalog::standard().items().to_vec();
        items.push(items[0].clone());
        assert!(Catalog::new(items, ServiceId::new("landing-page")).is_err());

        let items = Catalog::standard().items().to_vec();
        let error = Catalog::new(items, ServiceId::new("multilingual")).expect_err("not a base");
        assert!(matches!(error, DomainError::CatalogInvariant(ref m) if m.contains("ADD_ON")));
    }

    #[test]
    fn loads_catalog_from_toml() {
        let catalog = Catalog::from_toml_str(
            r#"
default_base_package = "starter"

[[items]]
id = "starter"
category = "BASE_PACKAGE"
title = "Starter"
description = "One page"
price_one_time = "100"
duration_days = 2

[[items]]
id = "care"
category = "SUPPORT"
title = "Care plan"
description = "Monthly upkeep"
price_recurring = "15.50"
"#,
        )
        .expect("catalog should parse");

        assert_eq!(catalog.items().len(), 2);
        let care = catalog.item_by_id(&ServiceId::new("care")).expect("care item");
        assert_eq!(care.price_one_time, Decimal::ZERO);
        assert_eq!(care.price_recurring, Some(Decimal::new(1550, 2)));
        assert_eq!(care.duration_days, 0);
    }

    #[test]
    fn toml_catalog_with_missing_default_is_invalid() {
        let result = Catalog::from_toml_str(
            r#"
default_base_package = "missing"

[[items]]
id = "starter"
category = "BASE_PACKAGE"
title = "Starter"
description = ""
price_one_time = "100"
"#,
        );

        assert!(matches!(result, Err(CatalogError::Invalid(DomainError::CatalogInvariant(_)))));
    }

    #[test]
    fn rejects_ids_with_surrounding_whitespace() {
        let mut items = Catalog::standard().items().to_vec();
        items[3].id = ServiceId::new(" multilingual");

        let error = Catalog::new(items, ServiceId::new("landing-page")).expect_err("padded id");
        assert!(matches!(error, DomainError::CatalogInvariant(ref m) if m.contains("whitespace")));
    }

    #[test]
    fn rejects_prices_above_the_item_bound() {
        let result = Catalog::from_toml_str(
            r#"
default_base_package = "huge"

[[items]]
id = "huge"
category = "BASE_PACKAGE"
title = "Huge"
description = ""
price_one_time = "10000000000000000000000000000"
"#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::Invalid(DomainError::CatalogInvariant(ref m))) if m.contains("huge")
        ));

        let mut items = Catalog::standard().items().to_vec();
        items[7].price_recurring = Some(Decimal::from(super::MAX_ITEM_PRICE) + Decimal::ONE);
        assert!(Catalog::new(items, ServiceId::new("landing-page")).is_err());
    }
}
