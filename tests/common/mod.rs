//! In-memory `Driver` over static HTML, plus builders for the catalog pages.
//!
//! Pages are rendered from a small UI state (selected list item, active tab,
//! expanded sections) and re-parsed on every call. Clicking an element with a
//! `data-select`, `data-tab` or `data-open` attribute changes that state, and
//! any state change invalidates all handles taken before it.

#![allow(dead_code)]

use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use totem_etl::domain::ports::Driver;
use totem_etl::utils::error::{DriverError, DriverResult};

pub const SITE_URL: &str = "https://totem.test";
pub const ELEMENTS_URL: &str = "https://totem.test/user.library.xhtml?l=ELEMENTTYPE";
pub const COMPONENTS_URL: &str = "https://totem.test/user.library.xhtml?l=COMPONENT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub selected: usize,
    pub tab: usize,
    pub open: HashSet<String>,
}

type Render = Box<dyn Fn(&UiState) -> String + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeNode {
    /// Child positions from the document root.
    path: Vec<usize>,
    version: u64,
}

#[derive(Default)]
struct FakeState {
    current: Option<String>,
    ui: UiState,
    version: u64,
    /// Text reads that fail as stale before succeeding, keyed by the text.
    stale_texts: HashMap<String, usize>,
    navigations: Vec<String>,
    typed: Vec<(String, String)>,
    clicks: usize,
}

pub struct FakeDriver {
    pages: HashMap<String, Render>,
    state: Mutex<FakeState>,
    /// Shared so a test can still count quits after the driver was moved.
    quits: Arc<AtomicUsize>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            state: Mutex::new(FakeState::default()),
            quits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_page(
        mut self,
        url: &str,
        render: impl Fn(&UiState) -> String + Send + Sync + 'static,
    ) -> Self {
        self.pages.insert(url.to_string(), Box::new(render));
        self
    }

    /// The next `times` reads of a node whose text is `text` fail as stale.
    pub fn stale_reads_of(&self, text: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .stale_texts
            .insert(text.to_string(), times);
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    /// `(name attribute of the input, text)` for every `type_text` call.
    pub fn typed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    pub fn quit_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.quits)
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn ui(&self) -> UiState {
        self.state.lock().unwrap().ui.clone()
    }

    fn document(&self) -> DriverResult<(Html, u64)> {
        let state = self.state.lock().unwrap();
        let url = state
            .current
            .as_ref()
            .ok_or_else(|| DriverError::Session("no page loaded".to_string()))?;
        let render = self
            .pages
            .get(url)
            .ok_or_else(|| DriverError::Session(format!("no page at {}", url)))?;
        Ok((Html::parse_document(&render(&state.ui)), state.version))
    }

    fn select(
        &self,
        scope: Option<&FakeNode>,
        selector: &str,
    ) -> DriverResult<Vec<FakeNode>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| DriverError::Script(format!("invalid selector '{}': {:?}", selector, e)))?;
        let (html, version) = self.document()?;
        let nodes = match scope {
            Some(scope) => resolve(&html, version, scope)?
                .select(&parsed)
                .map(|element| node_of(element, version))
                .collect(),
            None => html
                .select(&parsed)
                .map(|element| node_of(element, version))
                .collect(),
        };
        Ok(nodes)
    }

    fn first(&self, scope: Option<&FakeNode>, selector: &str) -> DriverResult<FakeNode> {
        self.select(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound {
                selector: selector.to_string(),
            })
    }

    fn with_element<T>(
        &self,
        node: &FakeNode,
        read: impl FnOnce(ElementRef<'_>) -> T,
    ) -> DriverResult<T> {
        let (html, version) = self.document()?;
        let element = resolve(&html, version, node)?;
        Ok(read(element))
    }
}

fn node_of(element: ElementRef<'_>, version: u64) -> FakeNode {
    let mut path: Vec<usize> = element
        .ancestors()
        .filter(|ancestor| ancestor.parent().is_some())
        .map(|ancestor| ancestor.prev_siblings().count())
        .collect();
    path.reverse();
    path.push(element.prev_siblings().count());
    FakeNode { path, version }
}

fn resolve<'h>(html: &'h Html, version: u64, node: &FakeNode) -> DriverResult<ElementRef<'h>> {
    if node.version != version {
        return Err(DriverError::Stale);
    }
    let mut current = html.tree.root();
    for &position in &node.path {
        current = current.children().nth(position).ok_or(DriverError::Stale)?;
    }
    ElementRef::wrap(current).ok_or(DriverError::Stale)
}

impl Driver for FakeDriver {
    type Node<'a> = FakeNode;

    fn navigate(&self, url: &str) -> DriverResult<()> {
        if !self.pages.contains_key(url) {
            return Err(DriverError::Session(format!("no page at {}", url)));
        }
        let mut state = self.state.lock().unwrap();
        state.current = Some(url.to_string());
        state.ui = UiState::default();
        state.version += 1;
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn find_one(&self, selector: &str) -> DriverResult<FakeNode> {
        self.first(None, selector)
    }

    fn find_all(&self, selector: &str) -> DriverResult<Vec<FakeNode>> {
        self.select(None, selector)
    }

    fn find_one_in<'a>(&'a self, scope: &FakeNode, selector: &str) -> DriverResult<FakeNode> {
        self.first(Some(scope), selector)
    }

    fn find_all_in<'a>(&'a self, scope: &FakeNode, selector: &str) -> DriverResult<Vec<FakeNode>> {
        self.select(Some(scope), selector)
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<FakeNode> {
        match self.first(None, selector) {
            Err(DriverError::NotFound { selector }) => Err(DriverError::Timeout { selector, timeout }),
            other => other,
        }
    }

    fn click<'a>(&'a self, node: &FakeNode) -> DriverResult<()> {
        let attributes = self.with_element(node, |element| {
            let value = element.value();
            (
                value.attr("data-select").and_then(|v| v.parse::<usize>().ok()),
                value.attr("data-tab").and_then(|v| v.parse::<usize>().ok()),
                value.attr("data-open").map(String::from),
            )
        })?;

        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        let (select, tab, open) = attributes;
        let mut changed = false;
        if let Some(index) = select {
            state.ui = UiState {
                selected: index,
                ..UiState::default()
            };
            changed = true;
        }
        if let Some(tab) = tab {
            state.ui.tab = tab;
            changed = true;
        }
        if let Some(section) = open {
            state.ui.open.insert(section);
            changed = true;
        }
        if changed {
            state.version += 1;
        }
        Ok(())
    }

    fn text<'a>(&'a self, node: &FakeNode) -> DriverResult<String> {
        let text = self.with_element(node, |element| {
            element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
        })?;
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.stale_texts.get_mut(&text) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Stale);
            }
        }
        Ok(text)
    }

    fn attribute<'a>(&'a self, node: &FakeNode, name: &str) -> DriverResult<Option<String>> {
        self.with_element(node, |element| element.value().attr(name).map(String::from))
    }

    fn run_script<'a>(
        &'a self,
        target: &FakeNode,
        _function: &str,
        _args: Vec<serde_json::Value>,
    ) -> DriverResult<()> {
        self.with_element(target, |_| ())
    }

    fn type_text<'a>(&'a self, node: &FakeNode, text: &str) -> DriverResult<()> {
        let name = self.with_element(node, |element| {
            element.value().attr("name").unwrap_or_default().to_string()
        })?;
        self.state
            .lock()
            .unwrap()
            .typed
            .push((name, text.to_string()));
        Ok(())
    }

    fn quit(&self) -> DriverResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Element library

pub struct SublayerFixture {
    pub label: &'static str,
    pub ratio: &'static str,
    pub name: &'static str,
    pub application: &'static str,
    pub lifetime: &'static str,
    pub thickness: Option<&'static str>,
}

pub enum LayerFixture {
    Homogeneous {
        identifier: &'static str,
        name: &'static str,
        application: &'static str,
        lifetime: &'static str,
        thickness: Option<&'static str>,
    },
    Heterogeneous {
        identifier: &'static str,
        sublayers: Vec<SublayerFixture>,
    },
    /// A layer type the extractor does not know.
    Other { classes: &'static str },
}

pub struct ElementFixture {
    pub name: &'static str,
    pub u_value: Option<&'static str>,
    pub layers: Vec<LayerFixture>,
}

fn properties(lifetime: &str, thickness: Option<&str>) -> String {
    let thickness = thickness
        .map(|t| format!(r#"<div class="param1">{}</div>"#, t))
        .unwrap_or_default();
    format!(
        r#"<div class="properties"><div class="lifetime">{}</div>{}</div>"#,
        lifetime, thickness
    )
}

fn layer_html(layer: &LayerFixture) -> String {
    match layer {
        LayerFixture::Homogeneous {
            identifier,
            name,
            application,
            lifetime,
            thickness,
        } => format!(
            r#"<div class="layerWrapper homogeneous"><div class="layer"><span class="identifier">{}</span><span class="name">{}</span><span class="category">{}</span>{}</div></div>"#,
            identifier,
            name,
            application,
            properties(lifetime, *thickness)
        ),
        LayerFixture::Heterogeneous {
            identifier,
            sublayers,
        } => {
            let sublayers: String = sublayers
                .iter()
                .map(|s| {
                    format!(
                        r#"<div class="sublayer"><span class="identifier">{}</span><span class="name">{}</span><span class="category">{}</span><span class="surfaceWeight">{}</span>{}</div>"#,
                        s.label,
                        s.name,
                        s.application,
                        s.ratio,
                        properties(s.lifetime, s.thickness)
                    )
                })
                .collect();
            format!(
                r#"<div class="layerWrapper heterogeneous"><div class="heterogeneous"><span class="identifier">{}</span>{}</div></div>"#,
                identifier, sublayers
            )
        }
        LayerFixture::Other { classes } => format!(
            r#"<div class="{}"><div class="layer"><span class="identifier">L?</span></div></div>"#,
            classes
        ),
    }
}

fn list_html(labels: &[&str], wrapper_class: &str) -> String {
    let items: String = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!(r#"<div class="item" data-select="{}">{}</div>"#, i, label))
        .collect();
    format!(
        r#"<div class="filterAndList"><div class="listArea"><div class="listAreaTitle"><span class="totalSize">{} results</span></div><div class="listWrapper"><div class="{}">{}</div></div></div></div>"#,
        labels.len(),
        wrapper_class,
        items
    )
}

fn library_html(kind: &str, south_part: String) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><div id="app"><div class="library"><div class="libraryDetail {}"><div><div class="south-part">{}</div></div></div></div></div></body></html>"#,
        kind, south_part
    )
}

pub fn elements_page(elements: &[ElementFixture], ui: &UiState) -> String {
    let labels: Vec<&str> = elements.iter().map(|e| e.name).collect();
    let details = elements
        .get(ui.selected)
        .map(|element| {
            let u_value = element
                .u_value
                .map(|u| {
                    format!(
                        r#"<span class="property uvalue"><span class="label">U-value</span><span class="value">{}</span></span>"#,
                        u
                    )
                })
                .unwrap_or_default();
            let layers: String = element.layers.iter().map(layer_html).collect();
            format!(
                r#"<div class="etLibraryObject"><div class="propertiesAndImage"><div><span class="property name"><span class="label">Name</span><span class="value">{}</span></span>{}</div></div><div class="layerTable"><div class="layerTableScroll"><div class="rowGroups"><div class="rows">{}</div></div></div></div></div>"#,
                element.name, u_value, layers
            )
        })
        .unwrap_or_default();
    library_html(
        "ELEMENTTYPE",
        format!(
            r#"{}<div class="selectionDetails">{}</div>"#,
            list_html(&labels, "list"),
            details
        ),
    )
}

// ---------------------------------------------------------------------------
// Component library

#[derive(Clone)]
pub struct MaterialFixture {
    pub description: &'static str,
    pub waste_category: &'static str,
    pub landfill: &'static str,
    pub incineration: &'static str,
    pub reuse: &'static str,
    pub recycling: &'static str,
    pub sorted: &'static str,
}

#[derive(Clone)]
pub struct PanelFixture {
    pub name: &'static str,
    pub application: &'static str,
    pub properties: Vec<(&'static str, &'static str)>,
    /// `None` leaves out the reversibility section.
    pub type_of_assembly: Option<&'static str>,
    /// `None` leaves out the end-of-life section.
    pub materials: Option<Vec<MaterialFixture>>,
    /// Collapsible sections rendered already expanded.
    pub open_sections: &'static [&'static str],
}

pub enum ComponentFixture {
    /// One panel per application unit; more than one adds a unit selector.
    DirectProduct(Vec<PanelFixture>),
    WorkSection(PanelFixture),
    /// One panel per variant tab.
    GroupedWorkSection(Vec<PanelFixture>),
    /// A detail panel of a layout the extractor does not know.
    Other(&'static str),
}

impl ComponentFixture {
    fn label(&self) -> &'static str {
        match self {
            ComponentFixture::DirectProduct(units) => units[0].name,
            ComponentFixture::WorkSection(panel) => panel.name,
            ComponentFixture::GroupedWorkSection(variants) => variants[0].name,
            ComponentFixture::Other(label) => label,
        }
    }
}

fn section_html(
    panel: &PanelFixture,
    section: &str,
    title: &str,
    ui: &UiState,
    content: String,
) -> String {
    let open = ui.open.contains(section) || panel.open_sections.contains(&section);
    format!(
        r#"<div class="collapsiblePanel {}"><div class="headerWrapper"><span class="header" data-open="{}">{}</span><span class="button{}"></span></div>{}</div>"#,
        section,
        section,
        title,
        if open { " open" } else { "" },
        if open {
            format!(r#"<div class="content">{}</div>"#, content)
        } else {
            String::new()
        }
    )
}

fn panel_sections(panel: &PanelFixture, ui: &UiState) -> String {
    let properties: String = panel
        .properties
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<span class="property"><span class="label">{}</span><span class="value">{}</span></span>"#,
                label, value
            )
        })
        .collect();
    let mut sections = format!(
        r#"<div class="collapsiblePanel general"><div class="headerWrapper"><span class="header">General</span><span class="button open"></span></div><div class="content"><div class="properties">{}</div></div></div>"#,
        properties
    );

    if let Some(kind) = panel.type_of_assembly {
        sections.push_str(&section_html(
            panel,
            "reversibility",
            "Reversibility",
            ui,
            format!(
                r#"<div class="typeOfAssembly"><div class="type"><span class="label">Type of assembly</span><span class="value">{}</span></div></div>"#,
                kind
            ),
        ));
    }
    if let Some(materials) = &panel.materials {
        let rows: String = materials
            .iter()
            .map(|m| {
                format!(
                    r#"<tr><td class="description">{}</td><td class="wsn">{}</td><td class="landfill">{}</td><td class="incineration">{}</td><td class="reuse">{}</td><td class="recycling">{}</td><td class="sorted">{}</td></tr>"#,
                    m.description, m.waste_category, m.landfill, m.incineration, m.reuse, m.recycling, m.sorted
                )
            })
            .collect();
        sections.push_str(&section_html(
            panel,
            "endOfLife",
            "End of life",
            ui,
            format!("<table><tbody>{}</tbody></table>", rows),
        ));
    }
    sections
}

fn title_html(panel: &PanelFixture) -> String {
    format!(
        r#"<span class="title"><span class="name">{}</span><span class="category">{}</span></span>"#,
        panel.name, panel.application
    )
}

fn tabs_html(count: usize) -> String {
    (0..count)
        .map(|i| format!(r#"<div class="tab" data-tab="{}">Variant {}</div>"#, i, i + 1))
        .collect()
}

fn component_detail(item: &ComponentFixture, ui: &UiState) -> String {
    match item {
        ComponentFixture::DirectProduct(units) => {
            let unit = &units[ui.tab.min(units.len() - 1)];
            let selector = if units.len() > 1 {
                format!(
                    r#"<div class="applicationUnitSelector"><div class="tabs">{}</div></div>"#,
                    tabs_html(units.len())
                )
            } else {
                String::new()
            };
            format!(
                r#"<div class="epdDetails">{}<div class="applicationUnitDetails">{}{}</div></div>"#,
                selector,
                title_html(unit),
                panel_sections(unit, ui)
            )
        }
        ComponentFixture::WorkSection(panel) => format!(
            r#"<div class="worksectionDetails">{}<div>{}</div></div>"#,
            title_html(panel),
            panel_sections(panel, ui)
        ),
        ComponentFixture::GroupedWorkSection(variants) => {
            let variant = &variants[ui.tab.min(variants.len() - 1)];
            format!(
                r#"<div class="groupDetails"><div class="header"><div class="variantSelector">{}</div></div><div class="worksectionDetails">{}<div>{}</div></div></div>"#,
                tabs_html(variants.len()),
                title_html(variant),
                panel_sections(variant, ui)
            )
        }
        ComponentFixture::Other(label) => {
            format!(r#"<div class="emptySelection"><span>{}</span></div>"#, label)
        }
    }
}

pub fn components_page(items: &[ComponentFixture], ui: &UiState) -> String {
    let labels: Vec<&str> = items.iter().map(ComponentFixture::label).collect();
    let details = items
        .get(ui.selected)
        .map(|item| component_detail(item, ui))
        .unwrap_or_default();
    library_html(
        "COMPONENT",
        format!(
            r#"{}<div class="selectionDetails">{}</div>"#,
            list_html(&labels, "list"),
            details
        ),
    )
}

// ---------------------------------------------------------------------------
// Home page with the login form

pub fn home_page(ui: &UiState) -> String {
    let logged_in = ui.open.contains("login-submitted");
    if logged_in {
        return r#"<!DOCTYPE html><html><body><div id="app"><div class="home-page"><div class="main-content">Welcome</div></div></div></body></html>"#.to_string();
    }
    let form_open = ui.open.contains("login-form");
    let form = if form_open {
        r#"<span><span>E-mail</span><span><input name="email"></span></span><span><span>Password</span><span><input name="password" type="password"></span></span>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html><html><body><div id="app"><div class="header"><div class="logo"></div><div class="bar"><div class="navigation"></div><div class="account"><div class="language">EN</div><div class="login"><div data-open="login-form">{}</div></div><div class="actions"><div class="primary"><div class="cancel">Cancel</div><div class="submit" data-open="login-submitted">Log in</div></div></div></div></div></div></div></body></html>"#,
        form
    )
}

// ---------------------------------------------------------------------------
// Fixture shortcuts

pub fn material(description: &'static str, sorted: &'static str) -> MaterialFixture {
    MaterialFixture {
        description,
        waste_category: "17 01 02",
        landfill: "10%",
        incineration: "0%",
        reuse: "20%",
        recycling: "70%",
        sorted,
    }
}

pub fn panel(name: &'static str, application: &'static str) -> PanelFixture {
    PanelFixture {
        name,
        application,
        properties: vec![
            ("Category", "Masonry"),
            ("Type", "Generic"),
            ("Database", "Ecoinvent 3.6"),
            ("ID", "LCI-0042"),
            ("Density", "1800 - 2000 kg/m³"),
            ("Functional unit", "1 m²"),
        ],
        type_of_assembly: Some("Mortar"),
        materials: Some(vec![material("Brick", "95%")]),
        open_sections: &[],
    }
}

pub fn homogeneous(
    identifier: &'static str,
    name: &'static str,
    application: &'static str,
) -> LayerFixture {
    LayerFixture::Homogeneous {
        identifier,
        name,
        application,
        lifetime: "60 years",
        thickness: Some("9 cm"),
    }
}
