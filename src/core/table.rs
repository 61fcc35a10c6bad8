//! Delimiter-separated encoding of the row types.

use crate::core::normalize::percentage_to_fraction;
use crate::domain::model::{
    ComponentKey, ComponentRow, DensityRange, ElementRow, MaterialFraction, MergedRow,
    OnSiteSorting, UnitCode,
};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

pub const ELEMENT_HEADERS: &[&str] = &[
    "Element Name",
    "Element U-Value",
    "Layer",
    "Composition",
    "Ratio",
    "Component Name",
    "Application",
    "Lifetime",
    "Thickness",
];

pub const COMPONENT_HEADERS: &[&str] = &[
    "Component Name",
    "Application",
    "Category",
    "Type",
    "Database",
    "LCI-ID",
    "Lambda",
    "R-Value",
    "U-Value",
    "Min Density",
    "Max Density",
    "Functional Unit",
    "Type of Assembly",
    "Material",
    "Waste Category",
    "Landfill",
    "Incineration",
    "Reuse",
    "Recycling",
    "Sorted on Building Site",
];

/// Element columns followed by the component columns minus the join key.
pub const MERGED_HEADERS: &[&str] = &[
    "Element Name",
    "Element U-Value",
    "Layer",
    "Composition",
    "Ratio",
    "Component Name",
    "Application",
    "Lifetime",
    "Thickness",
    "Category",
    "Type",
    "Database",
    "LCI-ID",
    "Lambda",
    "R-Value",
    "U-Value",
    "Min Density",
    "Max Density",
    "Functional Unit",
    "Type of Assembly",
    "Material",
    "Waste Category",
    "Landfill",
    "Incineration",
    "Reuse",
    "Recycling",
    "Sorted on Building Site",
];

pub const MISSING_HEADERS: &[&str] = &["Component Name", "Application"];

pub trait ToRecord {
    const HEADERS: &'static [&'static str];
    fn to_record(&self) -> Vec<String>;
}

pub trait FromRecord: Sized {
    fn from_record(record: &StringRecord) -> Result<Self>;
}

pub fn encode<T: ToRecord>(rows: &[T], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

pub fn decode<T: ToRecord + FromRecord>(data: &[u8], delimiter: u8) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(T::HEADERS.iter().copied()) {
        return Err(EtlError::ProcessingError {
            message: format!(
                "Unexpected table header '{}', expected '{}'",
                headers.iter().collect::<Vec<_>>().join(","),
                T::HEADERS.join(",")
            ),
        });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = T::from_record(&record?).map_err(|e| EtlError::ProcessingError {
            message: format!("Table row {}: {}", index + 1, e),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    record.get(index).ok_or_else(|| EtlError::MissingFieldError {
        field: name.to_string(),
    })
}

fn optional_field(record: &StringRecord, index: usize, name: &str) -> Result<Option<String>> {
    let value = field(record, index, name)?;
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn fraction_field(record: &StringRecord, index: usize, name: &str) -> Result<f64> {
    let value = field(record, index, name)?;
    value
        .parse()
        .map_err(|_| EtlError::parse(value, format!("'{}' is not a fraction", name)))
}

impl ToRecord for ElementRow {
    const HEADERS: &'static [&'static str] = ELEMENT_HEADERS;

    fn to_record(&self) -> Vec<String> {
        vec![
            self.element_name.clone(),
            optional(&self.element_u_value),
            self.layer.clone(),
            self.composition.clone(),
            self.ratio.to_string(),
            self.component.name.clone(),
            self.component.application.clone(),
            self.lifetime.clone(),
            optional(&self.thickness),
        ]
    }
}

impl FromRecord for ElementRow {
    fn from_record(record: &StringRecord) -> Result<Self> {
        Ok(ElementRow {
            element_name: field(record, 0, "Element Name")?.to_string(),
            element_u_value: optional_field(record, 1, "Element U-Value")?,
            layer: field(record, 2, "Layer")?.to_string(),
            composition: field(record, 3, "Composition")?.to_string(),
            ratio: fraction_field(record, 4, "Ratio")?,
            component: ComponentKey::new(
                field(record, 5, "Component Name")?,
                field(record, 6, "Application")?,
            ),
            lifetime: field(record, 7, "Lifetime")?.to_string(),
            thickness: optional_field(record, 8, "Thickness")?,
        })
    }
}

impl ComponentRow {
    /// Every column after the join key.
    fn attribute_fields(&self) -> Vec<String> {
        let (min_density, max_density) = match &self.density {
            Some(range) => (range.min.clone(), range.max.clone()),
            None => (String::new(), String::new()),
        };
        vec![
            optional(&self.category),
            optional(&self.kind),
            optional(&self.database),
            optional(&self.lci_id),
            optional(&self.lambda),
            optional(&self.r_value),
            optional(&self.u_value),
            min_density,
            max_density,
            self.functional_unit.to_string(),
            optional(&self.type_of_assembly),
            self.material.description.clone(),
            self.material.waste_category.clone(),
            self.material.landfill.to_string(),
            self.material.incineration.to_string(),
            self.material.reuse.to_string(),
            self.material.recycling.to_string(),
            self.material.sorted_on_site.to_string(),
        ]
    }
}

impl ToRecord for ComponentRow {
    const HEADERS: &'static [&'static str] = COMPONENT_HEADERS;

    fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.key.name.clone(), self.key.application.clone()];
        record.extend(self.attribute_fields());
        record
    }
}

impl FromRecord for ComponentRow {
    fn from_record(record: &StringRecord) -> Result<Self> {
        let density = match (
            optional_field(record, 9, "Min Density")?,
            optional_field(record, 10, "Max Density")?,
        ) {
            (Some(min), Some(max)) => Some(DensityRange { min, max }),
            _ => None,
        };
        let sorted = field(record, 19, "Sorted on Building Site")?;
        // A fraction is only taken back if it prints as the same text.
        let sorted_on_site = match sorted.parse::<f64>() {
            Ok(value) if value.to_string() == sorted => OnSiteSorting::Fraction(value),
            Err(_) if sorted.contains('%') => {
                OnSiteSorting::Fraction(percentage_to_fraction(sorted)?)
            }
            _ => OnSiteSorting::Text(sorted.to_string()),
        };

        Ok(ComponentRow {
            key: ComponentKey::new(
                field(record, 0, "Component Name")?,
                field(record, 1, "Application")?,
            ),
            category: optional_field(record, 2, "Category")?,
            kind: optional_field(record, 3, "Type")?,
            database: optional_field(record, 4, "Database")?,
            lci_id: optional_field(record, 5, "LCI-ID")?,
            lambda: optional_field(record, 6, "Lambda")?,
            r_value: optional_field(record, 7, "R-Value")?,
            u_value: optional_field(record, 8, "U-Value")?,
            density,
            functional_unit: UnitCode::from_code(field(record, 11, "Functional Unit")?),
            type_of_assembly: optional_field(record, 12, "Type of Assembly")?,
            material: MaterialFraction {
                description: field(record, 13, "Material")?.to_string(),
                waste_category: field(record, 14, "Waste Category")?.to_string(),
                landfill: fraction_field(record, 15, "Landfill")?,
                incineration: fraction_field(record, 16, "Incineration")?,
                reuse: fraction_field(record, 17, "Reuse")?,
                recycling: fraction_field(record, 18, "Recycling")?,
                sorted_on_site,
            },
        })
    }
}

impl ToRecord for MergedRow {
    const HEADERS: &'static [&'static str] = MERGED_HEADERS;

    fn to_record(&self) -> Vec<String> {
        let mut record = self.element.to_record();
        match &self.component {
            Some(component) => record.extend(component.attribute_fields()),
            None => record.resize(MERGED_HEADERS.len(), String::new()),
        }
        record
    }
}

impl ToRecord for ComponentKey {
    const HEADERS: &'static [&'static str] = MISSING_HEADERS;

    fn to_record(&self) -> Vec<String> {
        vec![self.name.clone(), self.application.clone()]
    }
}

impl FromRecord for ComponentKey {
    fn from_record(record: &StringRecord) -> Result<Self> {
        Ok(ComponentKey::new(
            field(record, 0, "Component Name")?,
            field(record, 1, "Application")?,
        ))
    }
}
