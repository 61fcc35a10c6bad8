//! CSS selectors for the TOTEM library pages.
//!
//! Update this file when the catalog markup changes.

use crate::core::navigator::ListSelectors;

const ELEMENTS_BASE: &str =
    "#app > div.library > div.libraryDetail.ELEMENTTYPE > div > div.south-part";
const COMPONENTS_BASE: &str =
    "#app > div.library > div.libraryDetail.COMPONENT > div > div.south-part";

/// Selectors relative to a layer row or sublayer.
pub mod layer {
    pub const HOMOGENEOUS_IDENTIFIER: &str = "div > span.identifier";
    pub const HETEROGENEOUS_IDENTIFIER: &str = "div.heterogeneous > span.identifier";
    pub const SUBLAYERS: &str = "div.heterogeneous > div.sublayer";
    pub const SUBLAYER_IDENTIFIER: &str = "span.identifier";
    pub const SUBLAYER_RATIO: &str = "span.surfaceWeight";

    #[derive(Debug, Clone, Copy)]
    pub struct Fields {
        pub name: &'static str,
        pub application: &'static str,
        pub lifetime: &'static str,
        pub thickness: &'static str,
    }

    pub const HOMOGENEOUS: Fields = Fields {
        name: "div > span.name",
        application: "div > span.category",
        lifetime: "div > div.properties > div.lifetime",
        thickness: "div > div.properties > div.param1",
    };

    pub const SUBLAYER: Fields = Fields {
        name: "span.name",
        application: "span.category",
        lifetime: "div.properties > div.lifetime",
        thickness: "div.properties > div.param1",
    };
}

/// Selectors relative to a declared property or an end-of-life table row.
pub mod component {
    pub const PROPERTY: &str = "span.property";
    pub const PROPERTY_LABEL: &str = "span.label";
    pub const PROPERTY_VALUE: &str = "span.value";
    pub const TAB: &str = "div.tab";

    pub const DESCRIPTION: &str = "td.description";
    pub const WASTE_CATEGORY: &str = "td.wsn";
    pub const LANDFILL: &str = "td.landfill";
    pub const INCINERATION: &str = "td.incineration";
    pub const REUSE: &str = "td.reuse";
    pub const RECYCLING: &str = "td.recycling";
    pub const SORTED_ON_SITE: &str = "td.sorted";
}

#[derive(Debug, Clone)]
pub struct ElementPageSelectors {
    pub list: ListSelectors,
    pub name: String,
    pub u_value: String,
    pub layer_rows: String,
}

impl Default for ElementPageSelectors {
    fn default() -> Self {
        let list = format!(
            "{} > div.filterAndList > div.listArea > div.listWrapper > div.list",
            ELEMENTS_BASE
        );
        let details = format!("{} > div.selectionDetails > div.etLibraryObject", ELEMENTS_BASE);
        Self {
            list: ListSelectors {
                items: format!("{} > div", list),
                list,
                total_size: format!(
                    "{} > div.filterAndList > div.listArea > div.listAreaTitle > span.totalSize",
                    ELEMENTS_BASE
                ),
            },
            name: format!(
                "{} > div.propertiesAndImage > div > span.property.name > span.value",
                details
            ),
            u_value: format!(
                "{} > div.propertiesAndImage > div > span.property.uvalue > span.value",
                details
            ),
            layer_rows: format!(
                "{} > div.layerTable > div.layerTableScroll > div.rowGroups > div.rows > div.layerWrapper",
                details
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentPageSelectors {
    pub list: ListSelectors,
    /// The single top-level panel whose class names the layout.
    pub selection_detail: String,
    /// Unit tabs of a direct product panel.
    pub unit_selector: String,
    /// Variant tabs of a grouped work-section panel.
    pub variant_tabs: String,
    selection_details: String,
}

impl Default for ComponentPageSelectors {
    fn default() -> Self {
        let list = format!(
            "{} > div.filterAndList > div.listArea > div.listWrapper > div",
            COMPONENTS_BASE
        );
        let selection_details = format!("{} > div.selectionDetails", COMPONENTS_BASE);
        Self {
            list: ListSelectors {
                items: format!("{} > div", list),
                list,
                total_size: format!(
                    "{} > div.filterAndList > div.listArea > div.listAreaTitle > span.totalSize",
                    COMPONENTS_BASE
                ),
            },
            selection_detail: format!("{} > div", selection_details),
            unit_selector: format!(
                "{} > div.epdDetails > div.applicationUnitSelector",
                selection_details
            ),
            variant_tabs: format!(
                "{} > div.groupDetails div.variantSelector > div.tab",
                selection_details
            ),
            selection_details,
        }
    }
}

impl ComponentPageSelectors {
    /// Field selectors for the detail panel rooted at `root` (relative to the
    /// selection details); collapsible panels sit `panel_parent` below it.
    pub fn panel(&self, root: &str, panel_parent: &str) -> PanelSelectors {
        let root = format!("{} > {}", self.selection_details, root);
        let panels = format!("{}{} > div.collapsiblePanel", root, panel_parent);
        let reversibility = format!("{}.reversibility", panels);
        let end_of_life = format!("{}.endOfLife", panels);
        PanelSelectors {
            name: format!("{} > span.title > span.name", root),
            application: format!("{} > span.title > span.category", root),
            properties: format!("{} > div.content > div.properties", panels),
            type_of_assembly: format!(
                "{} > div.content > div.typeOfAssembly > div.type > span.value",
                reversibility
            ),
            materials: format!("{} > div.content > table > tbody > tr", end_of_life),
            reversibility: CollapsibleSelectors::new(reversibility),
            end_of_life: CollapsibleSelectors::new(end_of_life),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanelSelectors {
    pub name: String,
    pub application: String,
    pub properties: String,
    pub type_of_assembly: String,
    pub materials: String,
    pub reversibility: CollapsibleSelectors,
    pub end_of_life: CollapsibleSelectors,
}

#[derive(Debug, Clone)]
pub struct CollapsibleSelectors {
    pub panel: String,
    pub open_marker: String,
    pub header: String,
}

impl CollapsibleSelectors {
    fn new(panel: String) -> Self {
        Self {
            open_marker: format!("{} > div.headerWrapper > span.button.open", panel),
            header: format!("{} > div.headerWrapper > span.header", panel),
            panel,
        }
    }
}
