//! Entry point of the asset manager's filter widgets.
//! Reads each widget's server-rendered markup, mounts its Yew component in
//! place, and attaches the page-wide form listeners.

use asset_filters::SetupError;
use log::{error, info, LevelFilter};
use web_sys::Element;
use yew::html::BaseComponent;

mod browser;
mod components;
mod config;
mod hooks;
mod markup;
mod registry;
mod shims;
mod utils;

use components::{ChipFilter, DateRangePicker, TagChips};
use config::*;
use markup::find_all;

// ──────────────────────────────────────────────────────────────────────────────
// Mounting

/// Mount `C` on every element matching `selector`, reading its props first.
/// Returns how many instances were mounted.
fn mount_all<C, F>(selector: &str, read_props: F) -> usize
where
    C: BaseComponent,
    F: Fn(&Element) -> Result<C::Properties, SetupError>,
{
    let mut mounted = 0;
    for root in find_all(&gloo_utils::document_element(), selector) {
        match read_props(&root) {
            Ok(props) => {
                yew::Renderer::<C>::with_root_and_props(root, props).render();
                mounted += 1;
            }
            Err(err) => error!("{err}"),
        }
    }
    mounted
}

/// The date picker is an `<input>` and cannot host an app; it is swapped for
/// a container first.
fn mount_date_pickers(search_mode: bool) -> usize {
    let mut mounted = 0;
    for picker in find_all(&gloo_utils::document_element(), DATE_PICKER) {
        let props = match markup::date_range(&picker, search_mode) {
            Ok(props) => props,
            Err(err) => {
                error!("{err}");
                continue;
            }
        };
        let host = match gloo_utils::document().create_element("div") {
            Ok(host) => host,
            Err(err) => {
                error!("date range: cannot create container: {err:?}");
                continue;
            }
        };
        host.set_class_name("js-date-range");
        if let Err(err) = picker.replace_with_with_node_1(&host) {
            error!("date range: cannot replace picker: {err:?}");
            continue;
        }
        yew::Renderer::<DateRangePicker>::with_root_and_props(host, props).render();
        mounted += 1;
    }
    mounted
}

/// Entry point: installs logging and mounts every widget on the page.
fn main() {
    console_error_panic_hook::set_once();
    browser::init_logging(LevelFilter::Info);

    let search_mode = browser::is_search_mode();

    let mut mounted = 0;
    mounted += mount_all::<ChipFilter, _>(PRODUCTS_ROOT, |root| markup::products(root, search_mode));
    mounted += mount_all::<ChipFilter, _>(AUTHORS_ROOT, |root| markup::authors(root, search_mode));
    mounted += mount_all::<ChipFilter, _>(CAMPAIGNS_ROOT, |root| markup::campaigns(root, search_mode));
    mounted += mount_all::<TagChips, _>(TAG_CHIPS_ROOT, markup::tag_chips);
    mounted += mount_date_pickers(search_mode);

    let mut listeners = shims::attach_multiselects(search_mode);
    if search_mode {
        listeners += shims::attach_search_mirrors();
    }
    listeners += shims::attach_submit_spinners();

    info!(
        "mounted {mounted} widgets, {listeners} form listeners (search mode: {search_mode})"
    );
}
