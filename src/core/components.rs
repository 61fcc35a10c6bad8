//! Extraction of catalogued components (products and work sections).
//!
//! The detail panel comes in three layouts. Each has its own entry point, and
//! all of them read fields through [`ComponentExtractor::read_panel`].

use crate::core::navigator::{retry_transient, Navigator, TraversalSettings};
use crate::core::normalize::{
    classify_functional_unit, extract_single_number, parse_density, percentage_to_fraction,
};
use crate::core::selectors::{component, CollapsibleSelectors, ComponentPageSelectors, PanelSelectors};
use crate::domain::model::{Component, ComponentKey, MaterialFraction, OnSiteSorting};
use crate::domain::ports::Driver;
use crate::domain::report::{Catalog, RunReport};
use crate::utils::error::{DriverError, EtlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    /// A product with an EPD, optionally split into application units.
    DirectProduct,
    WorkSection,
    /// Work section with variant tabs.
    GroupedWorkSection,
}

impl PanelLayout {
    pub const ALL: [PanelLayout; 3] = [
        PanelLayout::DirectProduct,
        PanelLayout::WorkSection,
        PanelLayout::GroupedWorkSection,
    ];

    pub fn detect(classes: &str) -> Option<Self> {
        let has = |name: &str| classes.split_whitespace().any(|class| class == name);
        if has("epdDetails") {
            Some(PanelLayout::DirectProduct)
        } else if has("worksectionDetails") {
            Some(PanelLayout::WorkSection)
        } else if has("groupDetails") {
            Some(PanelLayout::GroupedWorkSection)
        } else {
            None
        }
    }

    fn selectors(self, page: &ComponentPageSelectors) -> PanelSelectors {
        match self {
            PanelLayout::DirectProduct => page.panel("div.epdDetails > div.applicationUnitDetails", ""),
            PanelLayout::WorkSection => page.panel("div.worksectionDetails", " > div"),
            PanelLayout::GroupedWorkSection => {
                page.panel("div.groupDetails > div.worksectionDetails", " > div")
            }
        }
    }
}

/// Values found in a panel's property list, keyed by their display label.
#[derive(Debug, Default, Clone, PartialEq)]
struct DeclaredProperties {
    category: Option<String>,
    kind: Option<String>,
    database: Option<String>,
    lci_id: Option<String>,
    lambda: Option<String>,
    r_value: Option<String>,
    u_value: Option<String>,
    density: Option<String>,
    functional_unit: Option<String>,
}

impl DeclaredProperties {
    fn slot(&mut self, label: &str) -> Option<&mut Option<String>> {
        match label {
            "Category" => Some(&mut self.category),
            "Type" => Some(&mut self.kind),
            "Database" => Some(&mut self.database),
            "ID" => Some(&mut self.lci_id),
            "Lambda" => Some(&mut self.lambda),
            "R-value" => Some(&mut self.r_value),
            "U-value" => Some(&mut self.u_value),
            "Density" => Some(&mut self.density),
            "Functional unit" => Some(&mut self.functional_unit),
            _ => None,
        }
    }
}

fn optional_number(value: Option<String>) -> Result<Option<String>> {
    value.as_deref().map(extract_single_number).transpose()
}

#[derive(Debug)]
pub struct ComponentExtraction {
    pub components: Vec<Component>,
    pub report: RunReport,
}

/// A variant tab that could not be read, keyed by whatever it showed.
#[derive(Debug)]
struct VariantFailure {
    key: Option<String>,
    error: EtlError,
}

/// Everything read from one list item. Variant tabs fail one by one.
#[derive(Debug, Default)]
struct ItemRead {
    components: Vec<Component>,
    failed_variants: Vec<VariantFailure>,
}

impl ItemRead {
    fn single(component: Component) -> Self {
        Self {
            components: vec![component],
            failed_variants: Vec::new(),
        }
    }
}

pub struct ComponentExtractor<'d, D: Driver> {
    driver: &'d D,
    navigator: Navigator<'d, D>,
    selectors: ComponentPageSelectors,
    settings: TraversalSettings,
}

impl<'d, D: Driver> ComponentExtractor<'d, D> {
    pub fn new(driver: &'d D, settings: TraversalSettings) -> Self {
        let selectors = ComponentPageSelectors::default();
        Self {
            driver,
            navigator: Navigator::new(driver, selectors.list.clone(), settings),
            selectors,
            settings,
        }
    }

    /// Opens the component library at `url` and extracts every listed item,
    /// recording items and variant tabs that fail in the report.
    pub fn run(&self, url: &str) -> Result<ComponentExtraction> {
        tracing::info!("Scraping components...");
        self.driver.navigate(url)?;
        self.driver
            .wait_for(&self.selectors.selection_detail, self.settings.wait_timeout)?;

        let listed = self.navigator.count()?;
        self.navigator.log_totals(listed);

        let mut report = RunReport::new(Catalog::Components, listed);
        let mut components = Vec::new();

        for index in 0..listed {
            let mut key = None;
            match self.navigator.visit(index, || self.read_item(index, &mut key)) {
                Ok(item) => {
                    let rows = item.components.iter().map(|c| c.materials.len()).sum();
                    report.record_success(item.components.len(), rows);
                    components.extend(item.components);
                    for failure in item.failed_variants {
                        report.record_failure(index, failure.key, &failure.error);
                    }
                }
                Err(e) => {
                    let key = key.or_else(|| self.identify_current());
                    report.record_failure(index, key, &e);
                }
            }
        }

        report.finish();
        Ok(ComponentExtraction { components, report })
    }

    fn read_item(&self, index: usize, key_seen: &mut Option<String>) -> Result<ItemRead> {
        let detail = self
            .driver
            .wait_for(&self.selectors.selection_detail, self.settings.wait_timeout)?;
        let classes = self.driver.attribute(&detail, "class")?.unwrap_or_default();

        match PanelLayout::detect(&classes) {
            Some(PanelLayout::DirectProduct) => self.extract_direct_product(index, key_seen),
            Some(PanelLayout::WorkSection) => self.extract_work_section(key_seen),
            Some(PanelLayout::GroupedWorkSection) => self.extract_grouped_work_section(index),
            None => Err(EtlError::UnknownPanelLayout { classes }),
        }
    }

    fn extract_direct_product(
        &self,
        index: usize,
        key_seen: &mut Option<String>,
    ) -> Result<ItemRead> {
        let panel = PanelLayout::DirectProduct.selectors(&self.selectors);
        let unit_selectors = self.driver.find_all(&self.selectors.unit_selector)?;
        if unit_selectors.len() == 1 {
            let tabs = format!("{} {}", self.selectors.unit_selector, component::TAB);
            self.read_variants(index, &tabs, &panel)
        } else {
            Ok(ItemRead::single(self.read_panel(&panel, key_seen)?))
        }
    }

    fn extract_work_section(&self, key_seen: &mut Option<String>) -> Result<ItemRead> {
        let panel = PanelLayout::WorkSection.selectors(&self.selectors);
        Ok(ItemRead::single(self.read_panel(&panel, key_seen)?))
    }

    fn extract_grouped_work_section(&self, index: usize) -> Result<ItemRead> {
        let panel = PanelLayout::GroupedWorkSection.selectors(&self.selectors);
        self.read_variants(index, &self.selectors.variant_tabs, &panel)
    }

    /// Activates every tab after the first and reads the panel for each. The
    /// first tab is the default view and is not read on its own.
    ///
    /// A tab that still fails after its retries is reported on its own; the
    /// other tabs are kept.
    fn read_variants(
        &self,
        index: usize,
        tab_selector: &str,
        panel: &PanelSelectors,
    ) -> Result<ItemRead> {
        let count = self.driver.find_all(tab_selector)?.len();
        if count < 2 {
            tracing::warn!(
                "No variant tabs beyond the default one for {} at {} ({} found), nothing extracted",
                self.identify_current().as_deref().unwrap_or("Unknown"),
                index + 1,
                count
            );
        }

        let mut item = ItemRead::default();
        for tab_index in 1..count {
            let mut key = None;
            let variant = retry_transient(
                self.settings.attempts,
                &format!("item {} tab {}", index + 1, tab_index + 1),
                || {
                    self.activate_tab(tab_selector, tab_index)?;
                    self.read_panel(panel, &mut key)
                },
            );
            match variant {
                Ok(component) => item.components.push(component),
                Err(error) => item.failed_variants.push(VariantFailure {
                    key: key.or_else(|| self.identify_current()),
                    error,
                }),
            }
        }
        Ok(item)
    }

    fn activate_tab(&self, tab_selector: &str, tab_index: usize) -> Result<()> {
        // Each click re-renders the tab strip, so resolve by index every time.
        let tabs = self.driver.find_all(tab_selector)?;
        let tab = tabs.get(tab_index).ok_or_else(|| DriverError::NotFound {
            selector: format!("{} (tab {})", tab_selector, tab_index + 1),
        })?;
        if let Err(e) = self.driver.click(tab) {
            if !e.is_transient() {
                return Err(e.into());
            }
            tracing::error!("Error clicking variant tab {}: {}", tab_index + 1, e);
        }
        Ok(())
    }

    fn read_panel(&self, panel: &PanelSelectors, key_seen: &mut Option<String>) -> Result<Component> {
        let name = self.wait_text(&panel.name)?;
        let application = self.wait_text(&panel.application)?;
        let key = ComponentKey::new(name, application);
        *key_seen = Some(key.to_string());

        let properties = self.read_properties(panel)?;
        let type_of_assembly = self.read_type_of_assembly(&key, panel)?;
        let materials = self.read_materials(&key, panel)?;

        let functional_unit = properties
            .functional_unit
            .as_deref()
            .map(classify_functional_unit)
            .ok_or_else(|| EtlError::MissingFieldError {
                field: "Functional unit".to_string(),
            })?;
        let density = match properties.density.as_deref() {
            Some(text) => parse_density(text)?,
            None => None,
        };

        Ok(Component {
            key,
            category: properties.category,
            kind: properties.kind,
            database: properties.database,
            lci_id: properties.lci_id,
            lambda: optional_number(properties.lambda)?,
            r_value: optional_number(properties.r_value)?,
            u_value: optional_number(properties.u_value)?,
            density,
            functional_unit,
            type_of_assembly,
            materials,
        })
    }

    fn read_properties(&self, panel: &PanelSelectors) -> Result<DeclaredProperties> {
        let mut properties = DeclaredProperties::default();
        for block in self.driver.find_all(&panel.properties)? {
            for property in self.driver.find_all_in(&block, component::PROPERTY)? {
                let label = match self.driver.find_one_in(&property, component::PROPERTY_LABEL) {
                    Ok(label) => self.driver.text(&label)?,
                    Err(DriverError::NotFound { .. }) => continue,
                    Err(e) => return Err(e.into()),
                };
                if let Some(slot) = properties.slot(label.trim()) {
                    let value = self.driver.find_one_in(&property, component::PROPERTY_VALUE)?;
                    *slot = Some(self.driver.text(&value)?);
                }
            }
        }
        Ok(properties)
    }

    fn read_type_of_assembly(
        &self,
        key: &ComponentKey,
        panel: &PanelSelectors,
    ) -> Result<Option<String>> {
        if !self.open_section(key, &panel.reversibility, "Reversibility")? {
            return Ok(None);
        }
        let values = self.driver.find_all(&panel.type_of_assembly)?;
        match values.as_slice() {
            [value] => Ok(Some(self.driver.text(value)?)),
            _ => {
                tracing::info!("Type of assembly not found for {}", key);
                Ok(None)
            }
        }
    }

    fn read_materials(
        &self,
        key: &ComponentKey,
        panel: &PanelSelectors,
    ) -> Result<Vec<MaterialFraction>> {
        if !self.open_section(key, &panel.end_of_life, "End of life")? {
            return Ok(Vec::new());
        }
        let rows = self.driver.find_all(&panel.materials)?;
        if rows.is_empty() {
            tracing::info!("No materials found for {}", key);
        }

        let mut materials = Vec::with_capacity(rows.len());
        for row in &rows {
            let sorted = self.cell(row, component::SORTED_ON_SITE)?;
            let sorted_on_site = if sorted.contains('%') {
                OnSiteSorting::Fraction(percentage_to_fraction(&sorted)?)
            } else {
                OnSiteSorting::Text(sorted)
            };
            materials.push(MaterialFraction {
                description: self.cell(row, component::DESCRIPTION)?,
                waste_category: self.cell(row, component::WASTE_CATEGORY)?,
                landfill: percentage_to_fraction(&self.cell(row, component::LANDFILL)?)?,
                incineration: percentage_to_fraction(&self.cell(row, component::INCINERATION)?)?,
                reuse: percentage_to_fraction(&self.cell(row, component::REUSE)?)?,
                recycling: percentage_to_fraction(&self.cell(row, component::RECYCLING)?)?,
                sorted_on_site,
            });
        }
        Ok(materials)
    }

    /// Expands a collapsible section if needed. `false` means the section is
    /// not there, which is treated as "no data".
    fn open_section(
        &self,
        key: &ComponentKey,
        section: &CollapsibleSelectors,
        label: &str,
    ) -> Result<bool> {
        if self.driver.find_all(&section.panel)?.len() != 1 {
            tracing::info!("{} toggle not found for {}", label, key);
            return Ok(false);
        }
        if self.driver.find_all(&section.open_marker)?.len() != 1 {
            let header = self.driver.find_one(&section.header)?;
            if let Err(e) = self.driver.click(&header) {
                if !e.is_transient() {
                    return Err(e.into());
                }
                tracing::error!("Error clicking {} toggle for {}: {}", label, key, e);
            }
            self.driver
                .wait_for(&section.open_marker, self.settings.wait_timeout)?;
        }
        Ok(true)
    }

    /// Best-effort identifier of whatever the detail panel shows, for logging.
    fn identify_current(&self) -> Option<String> {
        PanelLayout::ALL.iter().find_map(|layout| {
            let panel = layout.selectors(&self.selectors);
            let name = self.find_text(&panel.name).ok()?;
            let application = self.find_text(&panel.application).ok()?;
            Some(ComponentKey::new(name, application).to_string())
        })
    }

    fn wait_text(&self, selector: &str) -> Result<String> {
        let node = self.driver.wait_for(selector, self.settings.wait_timeout)?;
        Ok(self.driver.text(&node)?)
    }

    fn find_text(&self, selector: &str) -> Result<String> {
        let node = self.driver.find_one(selector)?;
        Ok(self.driver.text(&node)?)
    }

    fn cell(&self, row: &D::Node<'d>, selector: &str) -> Result<String> {
        let node = self.driver.find_one_in(row, selector)?;
        Ok(self.driver.text(&node)?)
    }
}
