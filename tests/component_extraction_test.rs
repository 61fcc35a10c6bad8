mod common;

use common::{
    components_page, material, panel, ComponentFixture, FakeDriver, MaterialFixture, PanelFixture,
    COMPONENTS_URL,
};
use std::time::Duration;
use totem_etl::core::components::ComponentExtractor;
use totem_etl::core::navigator::TraversalSettings;
use totem_etl::domain::model::{ComponentKey, DensityRange, OnSiteSorting, UnitCode};
use totem_etl::utils::error::ErrorCategory;

fn settings() -> TraversalSettings {
    TraversalSettings {
        wait_timeout: Duration::from_millis(10),
        attempts: 2,
    }
}

fn driver(items: Vec<ComponentFixture>) -> FakeDriver {
    FakeDriver::new().with_page(COMPONENTS_URL, move |ui| components_page(&items, ui))
}

fn insulation() -> PanelFixture {
    PanelFixture {
        name: "Mineral wool",
        application: "Insulation",
        properties: vec![
            ("Category", "Insulation"),
            ("Database", "Ecoinvent 3.6"),
            ("Lambda", "0.035 W/mK"),
            ("Density", "Not applicable"),
            ("Functional unit", "1 kg"),
            ("Manufacturer", "Ignored"),
        ],
        type_of_assembly: None,
        materials: Some(vec![material("Mineral wool", "n/a")]),
        open_sections: &[],
    }
}

#[test]
fn test_work_section_opens_collapsed_sections() {
    let driver = driver(vec![ComponentFixture::WorkSection(panel("Brick wall", "Facade"))]);
    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 1);
    let component = &extraction.components[0];
    assert_eq!(component.key, ComponentKey::new("Brick wall", "Facade"));
    assert_eq!(component.category.as_deref(), Some("Masonry"));
    assert_eq!(component.kind.as_deref(), Some("Generic"));
    assert_eq!(component.database.as_deref(), Some("Ecoinvent 3.6"));
    assert_eq!(component.lci_id.as_deref(), Some("LCI-0042"));
    assert_eq!(component.lambda, None);
    assert_eq!(
        component.density,
        Some(DensityRange {
            min: "1800".to_string(),
            max: "2000".to_string(),
        })
    );
    assert_eq!(component.functional_unit, UnitCode::Area);
    assert_eq!(component.type_of_assembly.as_deref(), Some("Mortar"));

    assert_eq!(component.materials.len(), 1);
    let brick = &component.materials[0];
    assert_eq!(brick.description, "Brick");
    assert_eq!(brick.waste_category, "17 01 02");
    assert_eq!(brick.landfill, 0.1);
    assert_eq!(brick.incineration, 0.0);
    assert_eq!(brick.reuse, 0.2);
    assert_eq!(brick.recycling, 0.7);
    assert_eq!(brick.sorted_on_site, OnSiteSorting::Fraction(0.95));

    let ui = driver.ui();
    assert!(ui.open.contains("reversibility"));
    assert!(ui.open.contains("endOfLife"));

    assert_eq!(extraction.report.extracted, 1);
    assert_eq!(extraction.report.rows, 1);
}

#[test]
fn test_direct_product_without_unit_selector() {
    let driver = driver(vec![ComponentFixture::DirectProduct(vec![insulation()])]);
    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 1);
    let component = &extraction.components[0];
    assert_eq!(component.lambda.as_deref(), Some("0.035"));
    // "Not applicable" is a placeholder, not a parse failure.
    assert_eq!(component.density, None);
    assert_eq!(component.functional_unit, UnitCode::Mass);
    assert_eq!(component.type_of_assembly, None);
    assert_eq!(
        component.materials[0].sorted_on_site,
        OnSiteSorting::Text("n/a".to_string())
    );
}

#[test]
fn test_direct_product_reads_unit_tabs_after_the_first() {
    let per_area = panel("Clay brick", "Facade");
    let per_volume = PanelFixture {
        properties: vec![("Category", "Masonry"), ("Functional unit", "1 m³")],
        ..panel("Clay brick", "Facade per m³")
    };
    let driver = driver(vec![ComponentFixture::DirectProduct(vec![
        per_area, per_volume,
    ])]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 1);
    assert_eq!(extraction.components[0].key.application, "Facade per m³");
    assert_eq!(extraction.components[0].functional_unit, UnitCode::Volume);
    assert_eq!(driver.ui().tab, 1);
}

#[test]
fn test_grouped_work_section_yields_one_record_per_variant() {
    let driver = driver(vec![ComponentFixture::GroupedWorkSection(vec![
        panel("Partition", "Default"),
        panel("Partition", "Timber studs"),
        panel("Partition", "Metal studs"),
    ])]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    let applications: Vec<&str> = extraction
        .components
        .iter()
        .map(|c| c.key.application.as_str())
        .collect();
    assert_eq!(applications, ["Timber studs", "Metal studs"]);
    assert_eq!(extraction.report.listed, 1);
    assert_eq!(extraction.report.extracted, 2);
    assert_eq!(extraction.report.rows, 2);
}

#[test]
fn test_failed_variant_keeps_its_siblings() {
    let metal_studs = PanelFixture {
        materials: Some(vec![MaterialFixture {
            landfill: "abc",
            ..material("Steel", "90%")
        }]),
        ..panel("Partition", "Metal studs")
    };
    let driver = driver(vec![ComponentFixture::GroupedWorkSection(vec![
        panel("Partition", "Default"),
        panel("Partition", "Timber studs"),
        metal_studs,
    ])]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    let applications: Vec<&str> = extraction
        .components
        .iter()
        .map(|c| c.key.application.as_str())
        .collect();
    assert_eq!(applications, ["Timber studs"]);
    assert_eq!(extraction.report.extracted, 1);

    let failures = &extraction.report.failures;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].position, 1);
    assert_eq!(
        failures[0].key.as_deref(),
        Some("'Partition' - 'Metal studs'")
    );
    assert_eq!(failures[0].category, ErrorCategory::Parse);
}

#[test]
fn test_group_with_only_the_default_tab_yields_nothing() {
    let driver = driver(vec![
        ComponentFixture::GroupedWorkSection(vec![panel("Partition", "Default")]),
        ComponentFixture::WorkSection(panel("Brick wall", "Facade")),
    ]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 1);
    assert_eq!(extraction.components[0].key.name, "Brick wall");
    assert!(extraction.report.failures.is_empty());
}

#[test]
fn test_stale_variant_is_read_again() {
    let driver = driver(vec![ComponentFixture::GroupedWorkSection(vec![
        panel("Partition", "Default"),
        panel("Partition", "Timber studs"),
        panel("Partition", "Metal studs"),
    ])]);
    driver.stale_reads_of("Metal studs", 1);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 2);
    assert_eq!(extraction.components[1].key.application, "Metal studs");
    assert!(extraction.report.failures.is_empty());
}

#[test]
fn test_open_sections_are_not_toggled() {
    let expanded = PanelFixture {
        open_sections: &["reversibility", "endOfLife"],
        ..panel("Brick wall", "Facade")
    };
    let driver = driver(vec![ComponentFixture::WorkSection(expanded)]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    let component = &extraction.components[0];
    assert_eq!(component.type_of_assembly.as_deref(), Some("Mortar"));
    assert_eq!(component.materials.len(), 1);
    // Only the list item was clicked.
    assert_eq!(driver.clicks(), 1);
    assert!(driver.ui().open.is_empty());
}

#[test]
fn test_sorting_without_percent_sign_stays_text() {
    let plain = PanelFixture {
        materials: Some(vec![material("Brick", "5")]),
        ..panel("Brick wall", "Facade")
    };
    let driver = driver(vec![ComponentFixture::WorkSection(plain)]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(
        extraction.components[0].materials[0].sorted_on_site,
        OnSiteSorting::Text("5".to_string())
    );
}

#[test]
fn test_failed_items_are_reported_and_skipped() {
    let no_unit = PanelFixture {
        properties: vec![("Category", "Masonry")],
        ..panel("Concrete block", "Wall")
    };
    let driver = driver(vec![
        ComponentFixture::WorkSection(panel("Brick wall", "Facade")),
        ComponentFixture::Other("Empty selection"),
        ComponentFixture::WorkSection(no_unit),
        ComponentFixture::DirectProduct(vec![insulation()]),
    ]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    let names: Vec<&str> = extraction
        .components
        .iter()
        .map(|c| c.key.name.as_str())
        .collect();
    assert_eq!(names, ["Brick wall", "Mineral wool"]);

    let failures = &extraction.report.failures;
    assert_eq!(failures.len(), 2);

    assert_eq!(failures[0].position, 2);
    assert_eq!(failures[0].key, None);
    assert!(failures[0].reason.contains("emptySelection"));

    assert_eq!(failures[1].position, 3);
    assert_eq!(
        failures[1].key.as_deref(),
        Some("'Concrete block' - 'Wall'")
    );
    assert_eq!(failures[1].category, ErrorCategory::Parse);
    assert!(failures[1].reason.contains("Functional unit"));
}

#[test]
fn test_component_without_end_of_life_has_no_rows() {
    let bare = PanelFixture {
        materials: None,
        ..panel("Paint", "Finish")
    };
    let driver = driver(vec![ComponentFixture::WorkSection(bare)]);

    let extraction = ComponentExtractor::new(&driver, settings())
        .run(COMPONENTS_URL)
        .unwrap();

    assert_eq!(extraction.components.len(), 1);
    assert!(extraction.components[0].materials.is_empty());
    assert!(extraction.components[0].rows().is_empty());
    assert_eq!(extraction.report.extracted, 1);
    assert_eq!(extraction.report.rows, 0);
}
