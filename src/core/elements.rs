//! Extraction of building elements and their layer build-up.

use crate::core::navigator::{Navigator, TraversalSettings};
use crate::core::normalize::{extract_single_number, percentage_to_fraction};
use crate::core::selectors::{layer, ElementPageSelectors};
use crate::domain::model::{ComponentKey, Element, Layer, LayerComponent, Sublayer};
use crate::domain::ports::Driver;
use crate::domain::report::{Catalog, RunReport};
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayerKind {
    Homogeneous,
    Heterogeneous,
}

impl LayerKind {
    fn from_classes(classes: &str) -> Option<Self> {
        classes.split_whitespace().find_map(|class| match class {
            "homogeneous" => Some(LayerKind::Homogeneous),
            "heterogeneous" => Some(LayerKind::Heterogeneous),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct ElementExtraction {
    pub elements: Vec<Element>,
    pub report: RunReport,
}

pub struct ElementExtractor<'d, D: Driver> {
    driver: &'d D,
    navigator: Navigator<'d, D>,
    selectors: ElementPageSelectors,
    settings: TraversalSettings,
}

impl<'d, D: Driver> ElementExtractor<'d, D> {
    pub fn new(driver: &'d D, settings: TraversalSettings) -> Self {
        let selectors = ElementPageSelectors::default();
        Self {
            driver,
            navigator: Navigator::new(driver, selectors.list.clone(), settings),
            selectors,
            settings,
        }
    }

    /// Opens the element library at `url` and extracts every listed element.
    /// Only failing to load the library itself is an error; individual
    /// elements that fail are recorded in the report.
    pub fn run(&self, url: &str) -> Result<ElementExtraction> {
        tracing::info!("Scraping elements...");
        self.driver.navigate(url)?;
        self.driver
            .wait_for(&self.selectors.name, self.settings.wait_timeout)?;

        let listed = self.navigator.count()?;
        self.navigator.log_totals(listed);

        let mut report = RunReport::new(Catalog::Elements, listed);
        let mut elements = Vec::with_capacity(listed);

        for index in 0..listed {
            let mut name = None;
            match self
                .navigator
                .visit(index, || self.read_element(&mut name))
            {
                Ok(element) => {
                    report.record_success(1, element.rows().len());
                    elements.push(element);
                }
                Err(e) => report.record_failure(index, name, &e),
            }
        }

        report.finish();
        Ok(ElementExtraction { elements, report })
    }

    /// Reads the element currently shown in the detail panel.
    fn read_element(&self, name_seen: &mut Option<String>) -> Result<Element> {
        // The name field is the signal that the panel switched to the new selection.
        let name_node = self
            .driver
            .wait_for(&self.selectors.name, self.settings.wait_timeout)?;
        let name = self.driver.text(&name_node)?;
        *name_seen = Some(name.clone());

        let u_value = self.read_u_value(&name);

        let rows = self.driver.find_all(&self.selectors.layer_rows)?;
        let mut layers = Vec::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            let layer = self.read_layer(row).inspect_err(|e| {
                tracing::debug!(
                    "Layer {} of element '{}' could not be read: {}",
                    position + 1,
                    name,
                    e
                );
            })?;
            layers.push(layer);
        }

        Ok(Element {
            name,
            u_value,
            layers,
        })
    }

    fn read_u_value(&self, element: &str) -> Option<String> {
        let text = self
            .driver
            .find_one(&self.selectors.u_value)
            .and_then(|node| self.driver.text(&node));
        match text {
            Ok(text) => extract_single_number(&text)
                .inspect_err(|e| {
                    tracing::debug!("Ignoring U-value of element '{}': {}", element, e)
                })
                .ok(),
            Err(_) => {
                tracing::debug!("No U-value found for element '{}'", element);
                None
            }
        }
    }

    fn read_layer(&self, row: &D::Node<'d>) -> Result<Layer> {
        let classes = self.driver.attribute(row, "class")?.unwrap_or_default();
        match LayerKind::from_classes(&classes) {
            Some(LayerKind::Homogeneous) => Ok(Layer::Homogeneous {
                identifier: self.child_text(row, layer::HOMOGENEOUS_IDENTIFIER)?,
                component: self.read_layer_component(row, &layer::HOMOGENEOUS)?,
            }),
            Some(LayerKind::Heterogeneous) => {
                let identifier = self.child_text(row, layer::HETEROGENEOUS_IDENTIFIER)?;
                let mut sublayers = Vec::new();
                for sublayer in self.driver.find_all_in(row, layer::SUBLAYERS)? {
                    sublayers.push(self.read_sublayer(&sublayer)?);
                }
                Ok(Layer::Heterogeneous {
                    identifier,
                    sublayers,
                })
            }
            None => Err(EtlError::UnknownLayerKind { classes }),
        }
    }

    fn read_sublayer(&self, sublayer: &D::Node<'d>) -> Result<Sublayer> {
        let mut composition = self.child_text(sublayer, layer::SUBLAYER_IDENTIFIER)?;
        // Labels are displayed with a trailing marker, e.g. "a)".
        composition.pop();
        let ratio = percentage_to_fraction(&self.child_text(sublayer, layer::SUBLAYER_RATIO)?)?;
        Ok(Sublayer {
            composition,
            ratio,
            component: self.read_layer_component(sublayer, &layer::SUBLAYER)?,
        })
    }

    fn read_layer_component(
        &self,
        scope: &D::Node<'d>,
        fields: &layer::Fields,
    ) -> Result<LayerComponent> {
        let key = ComponentKey::new(
            self.child_text(scope, fields.name)?,
            self.child_text(scope, fields.application)?,
        );
        let lifetime = extract_single_number(&self.child_text(scope, fields.lifetime)?)?;
        let thickness = self
            .child_text(scope, fields.thickness)
            .and_then(|text| extract_single_number(&text))
            .inspect_err(|_| tracing::debug!("No thickness found for component {}", key))
            .ok();
        Ok(LayerComponent {
            key,
            lifetime,
            thickness,
        })
    }

    fn child_text(&self, scope: &D::Node<'d>, selector: &str) -> Result<String> {
        let node = self.driver.find_one_in(scope, selector)?;
        Ok(self.driver.text(&node)?)
    }
}
