use crate::dom::{self, DomSurface, Observers};
use crate::log::{LogLevel, Logger};
use crate::motion::{MotionConfig, RevealKind, Sighting, Synchronizer, Task};
use crate::stats::{decode_package_info, PackageInfo, StatsError, StatsLine, DEFAULT_STATS_ENDPOINT};
use gloo_net::http::Request;
use js_sys::Array;
use std::rc::{Rc, Weak};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Document, DocumentReadyState, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit,
};

const STATS_ENDPOINT_META: &str = "meta[name=\"package-stats-endpoint\"]";
const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

type Runtime = crate::motion::Runtime<DomSurface>;

fn motion_config(document: &Document) -> MotionConfig {
    let body = document.body();
    MotionConfig::from_lookup(|key| body.as_ref()?.get_attribute(&format!("data-{key}")))
}

fn listen(
    target: &EventTarget,
    event_name: &str,
    runtime: &Rc<Runtime>,
    handler: impl Fn(&mut Synchronizer, &mut DomSurface, &Event) + 'static,
) {
    let runtime = runtime.clone();
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        runtime.dispatch(&event.type_(), |sync, surface| handler(sync, surface, &event));
    });

    if target
        .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
        .is_ok()
    {
        callback.forget();
    }
}

fn observe(
    runtime: &Rc<Runtime>,
    targets: Vec<(usize, Element)>,
    config: &MotionConfig,
    root_margin: &str,
    handler: impl Fn(&mut Synchronizer, &mut DomSurface, &[Sighting]) + 'static,
) -> Option<IntersectionObserver> {
    if targets.is_empty() {
        return None;
    }

    let lookup = targets.clone();
    let dispatcher = runtime.clone();
    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, _observer: IntersectionObserver| {
            let batch: Vec<Sighting> = entries
                .iter()
                .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let target = entry.target();
                    let (index, _) = lookup.iter().find(|(_, element)| *element == target)?;
                    Some(Sighting {
                        index: *index,
                        intersecting: entry.is_intersecting(),
                    })
                })
                .collect();

            dispatcher.dispatch("intersection", |sync, surface| handler(sync, surface, &batch));
        },
    );

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    options.set_root_margin(root_margin);

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()?;
    callback.forget();

    for (_, element) in &targets {
        observer.observe(element);
    }
    Some(observer)
}

fn attach_observers(runtime: &Rc<Runtime>, config: &MotionConfig) {
    let (cards, reveals, on_scroll, skills_section) = {
        let surface = runtime.surface();
        let elements = surface.elements();
        (
            elements.reveals_where(|kind| kind == RevealKind::Card),
            elements.reveals_where(|kind| !matches!(kind, RevealKind::Card | RevealKind::OnScroll)),
            elements.reveals_where(|kind| kind == RevealKind::OnScroll),
            elements.skills_section.clone(),
        )
    };

    let reveal_margin = config.reveal_root_margin();
    let observers = Observers {
        cards: observe(runtime, cards, config, &reveal_margin, |sync, surface, batch| {
            sync.on_intersect(batch, surface)
        }),
        reveals: observe(runtime, reveals, config, &reveal_margin, |sync, surface, batch| {
            sync.on_intersect(batch, surface)
        }),
        on_scroll: observe(
            runtime,
            on_scroll,
            config,
            &config.scroll_reveal_root_margin(),
            |sync, surface, batch| sync.on_intersect(batch, surface),
        ),
        skills: observe(
            runtime,
            skills_section.into_iter().map(|section| (0, section)).collect(),
            config,
            &reveal_margin,
            |sync, surface, batch| {
                let visible = batch.iter().any(|sighting| sighting.intersecting);
                sync.on_skills_intersect(visible, surface)
            },
        ),
    };

    runtime.surface_mut().set_observers(observers);
}

fn attach_listeners(runtime: &Rc<Runtime>, document: &Document) {
    if let Some(win) = window() {
        listen(&win, "scroll", runtime, |sync, surface, _| sync.on_scroll(surface));
    }

    let (toggle, nav_links) = {
        let surface = runtime.surface();
        let elements = surface.elements();
        (elements.nav_toggle.clone(), elements.nav_links().to_vec())
    };

    if let Some(toggle) = toggle {
        listen(&toggle, "click", runtime, |sync, surface, _| sync.on_menu_toggle(surface));
    }

    for link in &nav_links {
        listen(link, "click", runtime, |sync, surface, _| sync.on_nav_link_click(surface));
    }

    let Ok(anchors) = document.query_selector_all(ANCHOR_SELECTOR) else {
        return;
    };
    for index in 0..anchors.length() {
        let Some(anchor) = anchors.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        let target = anchor.clone();
        listen(&anchor, "click", runtime, move |sync, surface, event| {
            let href = target.get_attribute("href").unwrap_or_default();
            if sync.on_anchor_click(&href, surface) {
                event.prevent_default();
            }
        });
    }
}

fn attach_lifecycle(runtime: &Rc<Runtime>, document: &Document) {
    if document.ready_state() == DocumentReadyState::Loading {
        listen(document, "DOMContentLoaded", runtime, |sync, surface, _| sync.on_ready(surface));
    } else {
        runtime.dispatch("DOMContentLoaded", |sync, surface| sync.on_ready(surface));
    }

    if document.ready_state() == DocumentReadyState::Complete {
        runtime.dispatch("load", |sync, surface| sync.on_load(surface));
    } else if let Some(win) = window() {
        listen(&win, "load", runtime, |sync, surface, _| sync.on_load(surface));
    }
}

async fn fetch_package_info(endpoint: &str) -> Result<PackageInfo, StatsError> {
    let response = Request::get(endpoint)
        .send()
        .await
        .map_err(|_| StatsError::Network)?;

    if !response.ok() {
        return Err(StatsError::Status(response.status()));
    }

    let body = response.text().await.map_err(|_| StatsError::Network)?;
    decode_package_info(&body)
}

fn stats_endpoint(document: &Document) -> String {
    document
        .query_selector(STATS_ENDPOINT_META)
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_STATS_ENDPOINT.to_string())
}

/// Fetches the package stats and writes them into the existing display
/// nodes once the request settles.
fn load_package_stats(document: Document, logger: Logger) {
    let endpoint = stats_endpoint(&document);

    spawn_local(async move {
        let result = fetch_package_info(&endpoint).await;

        match &result {
            Ok(_) => logger.event(
                LogLevel::Debug,
                "package_stats_loaded",
                serde_json::json!({ "endpoint": endpoint }),
            ),
            Err(error) => logger.event(
                LogLevel::Warn,
                "package_stats_fallback",
                serde_json::json!({ "endpoint": endpoint, "error": error.to_string() }),
            ),
        }

        let line = StatsLine::from_result(result);
        for (id, text) in line.targets() {
            match document.get_element_by_id(id) {
                Some(node) => node.set_text_content(Some(text)),
                None => logger.event(
                    LogLevel::Debug,
                    "package_stats_node_missing",
                    serde_json::json!({ "id": id }),
                ),
            }
        }
    });
}

pub fn run() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    let config = motion_config(&document);
    let logger = Logger::new(if config.debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });
    let (registry, elements) = dom::discover(&document);

    logger.event(
        LogLevel::Debug,
        "motion_registry",
        serde_json::json!({
            "sections": registry.sections.len(),
            "nav_links": registry.nav_links.len(),
            "reveals": registry.reveals.len(),
            "skills": registry.skills.len(),
        }),
    );

    let runtime = Rc::new_cyclic(|weak: &Weak<Runtime>| {
        let weak = weak.clone();
        let deliver: Rc<dyn Fn(Task)> = Rc::new(move |task: Task| {
            if let Some(runtime) = weak.upgrade() {
                runtime.dispatch(&format!("{task:?}"), |sync, surface| {
                    surface.timer_fired(task);
                    sync.on_timer(task, surface);
                });
            }
        });

        Runtime::new(
            Synchronizer::new(registry, config.clone()),
            DomSurface::new(elements, deliver, logger),
            logger,
        )
    });

    attach_observers(&runtime, &config);
    attach_listeners(&runtime, &document);
    runtime.dispatch("start", |sync, surface| sync.start(surface));
    attach_lifecycle(&runtime, &document);

    load_package_stats(document, logger);
}
