use crate::domain::report::RunReport;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composition label given to the single material of a homogeneous layer.
pub const HOMOGENEOUS_COMPOSITION: &str = "a";

/// Join key between layer references and catalogued components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub name: String,
    pub application: String,
}

impl ComponentKey {
    pub fn new(name: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            application: application.into(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' - '{}'", self.name, self.application)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub u_value: Option<String>,
    /// Outer-to-inner surface order.
    pub layers: Vec<Layer>,
}

impl Element {
    /// One row per homogeneous layer and one per sublayer of a heterogeneous layer.
    pub fn rows(&self) -> Vec<ElementRow> {
        let mut rows = Vec::new();
        for layer in &self.layers {
            match layer {
                Layer::Homogeneous {
                    identifier,
                    component,
                } => rows.push(self.row(identifier, HOMOGENEOUS_COMPOSITION, 1.0, component)),
                Layer::Heterogeneous {
                    identifier,
                    sublayers,
                } => {
                    for sublayer in sublayers {
                        rows.push(self.row(
                            identifier,
                            &sublayer.composition,
                            sublayer.ratio,
                            &sublayer.component,
                        ));
                    }
                }
            }
        }
        rows
    }

    fn row(
        &self,
        layer: &str,
        composition: &str,
        ratio: f64,
        component: &LayerComponent,
    ) -> ElementRow {
        ElementRow {
            element_name: self.name.clone(),
            element_u_value: self.u_value.clone(),
            layer: layer.to_string(),
            composition: composition.to_string(),
            ratio,
            component: component.key.clone(),
            lifetime: component.lifetime.clone(),
            thickness: component.thickness.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Homogeneous {
        identifier: String,
        component: LayerComponent,
    },
    Heterogeneous {
        identifier: String,
        sublayers: Vec<Sublayer>,
    },
}

impl Layer {
    pub fn identifier(&self) -> &str {
        match self {
            Layer::Homogeneous { identifier, .. } | Layer::Heterogeneous { identifier, .. } => {
                identifier
            }
        }
    }

    /// Sum of the weight ratios. The catalog does not guarantee 1.0 for
    /// heterogeneous layers, so callers decide what to do with a mismatch.
    pub fn ratio_sum(&self) -> f64 {
        match self {
            Layer::Homogeneous { .. } => 1.0,
            Layer::Heterogeneous { sublayers, .. } => sublayers.iter().map(|s| s.ratio).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sublayer {
    pub composition: String,
    pub ratio: f64,
    pub component: LayerComponent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerComponent {
    pub key: ComponentKey,
    /// Service life in years.
    pub lifetime: String,
    pub thickness: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementRow {
    pub element_name: String,
    pub element_u_value: Option<String>,
    pub layer: String,
    pub composition: String,
    pub ratio: f64,
    pub component: ComponentKey,
    pub lifetime: String,
    pub thickness: Option<String>,
}

/// Measurement basis a component's data is normalised to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitCode {
    Area,
    Volume,
    Length,
    Mass,
    Count,
    Power,
    /// Unrecognised display text, kept verbatim.
    Other(String),
}

impl UnitCode {
    pub fn as_str(&self) -> &str {
        match self {
            UnitCode::Area => "sqm",
            UnitCode::Volume => "cbm",
            UnitCode::Length => "m",
            UnitCode::Mass => "kg",
            UnitCode::Count => "piece",
            UnitCode::Power => "kW",
            UnitCode::Other(raw) => raw,
        }
    }

    /// Inverse of [`UnitCode::as_str`], used when reading tables back.
    pub fn from_code(code: &str) -> Self {
        match code {
            "sqm" => UnitCode::Area,
            "cbm" => UnitCode::Volume,
            "m" => UnitCode::Length,
            "kg" => UnitCode::Mass,
            "piece" => UnitCode::Count,
            "kW" => UnitCode::Power,
            other => UnitCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Density bounds in kg/m³, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityRange {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnSiteSorting {
    Fraction(f64),
    /// Non-percentage text shown by the catalog, e.g. "n/a".
    Text(String),
}

impl fmt::Display for OnSiteSorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnSiteSorting::Fraction(value) => write!(f, "{}", value),
            OnSiteSorting::Text(text) => f.write_str(text),
        }
    }
}

/// One row of a component's end-of-life table.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialFraction {
    pub description: String,
    pub waste_category: String,
    pub landfill: f64,
    pub incineration: f64,
    pub reuse: f64,
    pub recycling: f64,
    pub sorted_on_site: OnSiteSorting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub key: ComponentKey,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub database: Option<String>,
    pub lci_id: Option<String>,
    pub lambda: Option<String>,
    pub r_value: Option<String>,
    pub u_value: Option<String>,
    pub density: Option<DensityRange>,
    pub functional_unit: UnitCode,
    pub type_of_assembly: Option<String>,
    pub materials: Vec<MaterialFraction>,
}

impl Component {
    /// One row per end-of-life material; a component without a table yields none.
    pub fn rows(&self) -> Vec<ComponentRow> {
        self.materials
            .iter()
            .map(|material| ComponentRow {
                key: self.key.clone(),
                category: self.category.clone(),
                kind: self.kind.clone(),
                database: self.database.clone(),
                lci_id: self.lci_id.clone(),
                lambda: self.lambda.clone(),
                r_value: self.r_value.clone(),
                u_value: self.u_value.clone(),
                density: self.density.clone(),
                functional_unit: self.functional_unit.clone(),
                type_of_assembly: self.type_of_assembly.clone(),
                material: material.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    pub key: ComponentKey,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub database: Option<String>,
    pub lci_id: Option<String>,
    pub lambda: Option<String>,
    pub r_value: Option<String>,
    pub u_value: Option<String>,
    pub density: Option<DensityRange>,
    pub functional_unit: UnitCode,
    pub type_of_assembly: Option<String>,
    pub material: MaterialFraction,
}

/// An element row with the attributes of its first matching component, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub element: ElementRow,
    pub component: Option<ComponentRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationResult {
    pub merged: Vec<MergedRow>,
    /// Distinct keys referenced by elements but absent from the components, in
    /// order of first reference.
    pub unmatched: Vec<ComponentKey>,
}

/// Output of a pipeline's extract phase.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub elements: Vec<ElementRow>,
    pub components: Vec<ComponentRow>,
    pub reports: Vec<RunReport>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub reconciliation: ReconciliationResult,
    pub reports: Vec<RunReport>,
}

/// Account used to log in to the catalog.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
