use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::quote::{QuoteDraft, SelectedItemSnapshot, TotalsSnapshot};
use crate::domain::service::{ServiceCategory, ServiceId, ServiceLineItem};
use crate::errors::DomainError;
use crate::pricing::catalog::Catalog;
use crate::pricing::money::{Currency, PricingPreferences, PricingRates};
use crate::pricing::totals::{compute_totals, Totals};

/// Set of chosen catalog ids. Order carries no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<ServiceId>);

impl Selection {
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceId> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn count_in_category(&self, catalog: &Catalog, category: ServiceCategory) -> usize {
        catalog.items_by_category(category).filter(|item| self.contains(&item.id)).count()
    }
}

impl FromIterator<ServiceId> for Selection {
    fn from_iter<T: IntoIterator<Item = ServiceId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderState {
    pub selection: Selection,
    pub preferences: PricingPreferences,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BuilderEvent {
    Toggle(ServiceId),
    SetCurrency(Currency),
    SetIncludeTax(bool),
}

/// Pure transition function. The next selection is built in full before it is
/// returned, so no caller can observe two base packages at once.
pub fn reduce(
    catalog: &Catalog,
    state: &BuilderState,
    event: BuilderEvent,
) -> Result<BuilderState, DomainError> {
    let mut next = state.clone();

    match event {
        BuilderEvent::Toggle(id) => {
            let item = catalog.require(&id)?;
            next.selection = toggle_selection(catalog, &state.selection, item);
        }
        BuilderEvent::SetCurrency(currency) => next.preferences.currency = currency,
        BuilderEvent::SetIncludeTax(include_tax) => next.preferences.include_tax = include_tax,
    }

    Ok(next)
}

fn toggle_selection(catalog: &Catalog, current: &Selection, item: &ServiceLineItem) -> Selection {
    let mut ids = current.0.clone();

    if item.category.is_single_choice() {
        // re-selecting the active base package keeps it
        for sibling in catalog.items_by_category(item.category) {
            ids.remove(&sibling.id);
        }
        ids.insert(item.id.clone());
    } else if !ids.remove(&item.id) {
        ids.insert(item.id.clone());
    }

    Selection(ids)
}

/// Session-scoped quote configurator over a shared, read-only catalog.
#[derive(Clone, Debug)]
pub struct QuoteBuilder {
    catalog: Arc<Catalog>,
    rates: PricingRates,
    state: BuilderState,
}

impl QuoteBuilder {
    /// Starts with the catalog's default base package selected, reference
    /// currency and tax excluded.
    pub fn new(catalog: Arc<Catalog>, rates: PricingRates) -> Self {
        let selection = Selection::from_iter([catalog.default_base_package().clone()]);
        Self {
            catalog,
            rates,
            state: BuilderState { selection, preferences: PricingPreferences::default() },
        }
    }

    /// Rehydrates a selection held by a client. A selection without a base
    /// package gets the default one.
    pub fn restore(
        catalog: Arc<Catalog>,
        rates: PricingRates,
        selected: impl IntoIterator<Item = ServiceId>,
        preferences: PricingPreferences,
    ) -> Result<Self, DomainError> {
        let mut selection = Selection::default();
        for id in selected {
            catalog.require(&id)?;
            selection.0.insert(id);
        }

        match selection.count_in_category(&catalog, ServiceCategory::BasePackage) {
            0 => {
                selection.0.insert(catalog.default_base_package().clone());
            }
            1 => {}
            _ => {
                return Err(DomainError::InvariantViolation(
                    "selection contains more than one base package".to_string(),
                ))
            }
        }

        Ok(Self { catalog, rates, state: BuilderState { selection, preferences } })
    }

    pub fn apply(&mut self, event: BuilderEvent) -> Result<(), DomainError> {
        self.state = reduce(&self.catalog, &self.state, event)?;
        Ok(())
    }

    pub fn toggle(&mut self, id: &ServiceId) -> Result<(), DomainError> {
        self.apply(BuilderEvent::Toggle(id.clone()))
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.state.preferences.currency = currency;
    }

    pub fn set_include_tax(&mut self, include_tax: bool) {
        self.state.preferences.include_tax = include_tax;
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rates(&self) -> &PricingRates {
        &self.rates
    }

    pub fn currency_code(&self) -> &str {
        self.rates.code(self.state.preferences.currency)
    }

    pub fn compute_totals(&self) -> Totals {
        compute_totals(&self.catalog, &self.state.selection, &self.state.preferences, &self.rates)
    }

    pub fn selected_items(&self) -> Vec<&ServiceLineItem> {
        self.catalog.items().iter().filter(|item| self.state.selection.contains(&item.id)).collect()
    }

    /// Snapshot handed to the submission pipeline.
    pub fn draft(&self) -> QuoteDraft {
        let totals = self.compute_totals();
        QuoteDraft {
            items: self
                .selected_items()
                .into_iter()
                .map(|item| SelectedItemSnapshot { id: item.id.clone(), title: item.title.clone() })
                .collect(),
            totals: TotalsSnapshot {
                one_time: totals.one_time_total,
                recurring: totals.recurring_total,
                currency: self.state.preferences.currency,
                currency_code: self.currency_code().to_string(),
                include_tax: self.state.preferences.include_tax,
                duration_days: totals.total_duration_days,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::{reduce, BuilderEvent, BuilderState, QuoteBuilder, Selection};
    use crate::domain::service::{ServiceCategory, ServiceId, ServiceLineItem};
    use crate::errors::DomainError;
    use crate::pricing::catalog::Catalog;
    use crate::pricing::money::{Currency, PricingPreferences, PricingRates};

    fn builder() -> QuoteBuilder {
        QuoteBuilder::new(Arc::new(Catalog::standard()), PricingRates::default())
    }

    fn id(value: &str) -> ServiceId {
        ServiceId::new(value)
    }

    fn base_count(builder: &QuoteBuilder) -> usize {
        builder
            .selected_items()
            .iter()
            .filter(|item| item.category == ServiceCategory::BasePackage)
            .count()
    }

    fn three_base_catalog() -> Catalog {
        let base = |key: &str, price: i64| ServiceLineItem {
            id: ServiceId::new(key),
            category: ServiceCategory::BasePackage,
            title: key.to_uppercase(),
            description: String::new(),
            price_one_time: Decimal::new(price, 0),
            price_recurring: None,
            duration_days: 1,
        };
        let addon = ServiceLineItem {
            id: ServiceId::new("extra"),
            category: ServiceCategory::AddOn,
            title: "Extra".to_string(),
            description: String::new(),
            price_one_time: Decimal::new(5, 0),
            price_recurring: None,
            duration_days: 1,
        };
        Catalog::new(vec![base("a", 10), base("b", 20), base("c", 30), addon], ServiceId::new("a"))
            .expect("valid test catalog")
    }

    #[test]
    fn fresh_builder_has_only_the_default_base_package() {
        let builder = builder();
        let selected = builder.selected_items();

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, id("landing-page"));
        assert_eq!(builder.compute_totals().total_duration_days, 3);
        assert_eq!(builder.state().preferences, PricingPreferences::default());
    }

    #[test]
    fn selecting_another_base_package_replaces_the_current_one() {
        let mut builder = builder();
        builder.toggle(&id("multilingual")).expect("toggle add-on");
        builder.toggle(&id("corporate-website")).expect("toggle base");

        let ids: Vec<_> = builder.selected_items().iter().map(|item| item.id.clone()).collect();
        assert_eq!(ids, vec![id("corporate-website"), id("multilingual")]);
    }

    #[test]
    fn reselecting_the_active_base_package_is_a_no_op() {
        let mut builder = builder();
        let before = builder.state().clone();

        builder.toggle(&id("landing-page")).expect("toggle base");

        assert_eq!(builder.state(), &before);
    }

    #[test]
    fn toggling_a_non_base_item_twice_restores_the_selection() {
        let mut builder = builder();
        let before = builder.state().clone();

        builder.toggle(&id("google-maps")).expect("add");
        assert_eq!(builder.state().selection.len(), 2);
        builder.toggle(&id("google-maps")).expect("remove");

        assert_eq!(builder.state(), &before);
    }

    #[test]
    fn unknown_item_is_rejected_without_changing_state() {
        let mut builder = builder();
        let before = builder.state().clone();

        let error = builder.toggle(&id("seo-audit")).expect_err("unknown id");

        assert!(matches!(error, DomainError::InvalidItemReference { ref id } if id.as_str() == "seo-audit"));
        assert_eq!(builder.state(), &before);
    }

    #[test]
    fn any_toggle_sequence_keeps_at_most_one_base_package() {
        let catalog = three_base_catalog();
        let keys = ["a", "b", "c", "extra"];
        let mut state = BuilderState::default();
        let mut seed = 17usize;

        for step in 0..200 {
            seed = (seed * 31 + 7) % 1009;
            let key = keys[seed % keys.len()];
            state = reduce(&catalog, &state, BuilderEvent::Toggle(id(key))).expect("known id");
            let bases = catalog
                .items_by_category(ServiceCategory::BasePackage)
                .filter(|item| state.selection.contains(&item.id))
                .count();
            assert!(bases <= 1, "step {step} left {bases} base packages selected");
        }
    }

    #[test]
    fn preference_events_leave_selection_untouched() {
        let catalog = Catalog::standard();
        let state = BuilderState {
            selection: Selection::from_iter([id("landing-page")]),
            ..BuilderState::default()
        };

        let next = reduce(&catalog, &state, BuilderEvent::SetCurrency(Currency::Local))
            .and_then(|state| reduce(&catalog, &state, BuilderEvent::SetIncludeTax(true)))
            .expect("preference events always succeed");

        assert_eq!(next.selection, state.selection);
        assert_eq!(next.preferences.currency, Currency::Local);
        assert!(next.preferences.include_tax);
    }

    #[test]
    fn switching_currency_and_back_restores_totals() {
        let mut builder = builder();
        builder.toggle(&id("tech-support")).expect("toggle");
        builder.set_include_tax(true);
        let original = builder.compute_totals();

        builder.set_currency(Currency::Local);
        let local = builder.compute_totals();
        assert_eq!(local.one_time_subtotal, Decimal::new(2925, 0));

        builder.set_currency(Currency::Reference);
        assert_eq!(builder.compute_totals(), original);
    }

    #[test]
    fn restore_fills_missing_base_package_and_rejects_two() {
        let catalog = Arc::new(Catalog::standard());

        let restored = QuoteBuilder::restore(
            catalog.clone(),
            PricingRates::default(),
            [id("hosting-setup")],
            PricingPreferences::default(),
        )
        .expect("restore");
        assert!(restored.state().selection.contains(&id("landing-page")));
        assert_eq!(base_count(&restored), 1);

        let error = QuoteBuilder::restore(
            catalog,
            PricingRates::default(),
            [id("landing-page"), id("corporate-website")],
            PricingPreferences::default(),
        )
        .expect_err("two base packages");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn draft_snapshots_ids_titles_and_totals() {
        let mut builder = builder();
        builder.toggle(&id("tech-support")).expect("toggle");
        builder.set_currency(Currency::Local);

        let draft = builder.draft();

        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].id, id("landing-page"));
        assert_eq!(draft.items[1].title, "Technical Support");
        assert_eq!(draft.totals.currency_code, "MDL");
        assert_eq!(draft.totals.one_time, Decimal::new(2925, 0));
        assert_eq!(draft.totals.recurring, Decimal::new(390, 0));
        assert!(!draft.totals.include_tax);
    }
}
