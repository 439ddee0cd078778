const DEFAULT_NAV_LOOKAHEAD: f64 = 150.0;
const DEFAULT_HOME_THRESHOLD: f64 = 200.0;
const DEFAULT_HOME_SECTION: &str = "inicio";
const DEFAULT_NAVBAR_THRESHOLD: f64 = 50.0;
const DEFAULT_PARALLAX_RATE: f64 = -0.5;
const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
const DEFAULT_REVEAL_MARGIN: f64 = 50.0;
const DEFAULT_SCROLL_REVEAL_MARGIN: f64 = 100.0;
const DEFAULT_CARD_STAGGER_MS: u32 = 200;
const DEFAULT_MARKER_DELAY_MS: u32 = 300;
const DEFAULT_PACKAGE_ITEM_STAGGER_MS: u32 = 100;
const DEFAULT_SKILL_STAGGER_MS: u32 = 150;
const DEFAULT_SKILL_FILL_DELAY_MS: u32 = 50;
const DEFAULT_SKILL_VIEWPORT_CHECK_MS: u32 = 500;
const DEFAULT_SKILL_FALLBACK_MS: u32 = 2_000;
const DEFAULT_SKILL_LOAD_CHECK_MS: u32 = 1_000;
const DEFAULT_NAV_RESYNC_MS: u32 = 300;

const PIXEL_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const PARALLAX_RATE_BOUNDS: (f64, f64) = (-2.0, 2.0);
const THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const DELAY_MS_BOUNDS: (u32, u32) = (0, 10_000);

/// Thresholds and delays for every scroll-driven behavior.
///
/// Defaults reproduce the page as shipped. [`MotionConfig::from_lookup`]
/// reads `motion-*` keys (the frontend feeds it `data-motion-*` attributes
/// of `<body>`); any key that is missing, unparsable or out of bounds keeps
/// its default.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionConfig {
    pub nav_lookahead: f64,
    pub home_threshold: f64,
    pub home_section: String,
    pub navbar_threshold: f64,
    pub parallax_rate: f64,
    pub reveal_threshold: f64,
    pub reveal_margin: f64,
    pub scroll_reveal_margin: f64,
    pub card_stagger_ms: u32,
    pub marker_delay_ms: u32,
    pub package_item_stagger_ms: u32,
    pub skill_stagger_ms: u32,
    pub skill_fill_delay_ms: u32,
    pub skill_viewport_check_ms: u32,
    pub skill_fallback_ms: u32,
    pub skill_load_check_ms: u32,
    pub nav_resync_ms: u32,
    pub debug: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            nav_lookahead: DEFAULT_NAV_LOOKAHEAD,
            home_threshold: DEFAULT_HOME_THRESHOLD,
            home_section: DEFAULT_HOME_SECTION.to_string(),
            navbar_threshold: DEFAULT_NAVBAR_THRESHOLD,
            parallax_rate: DEFAULT_PARALLAX_RATE,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            reveal_margin: DEFAULT_REVEAL_MARGIN,
            scroll_reveal_margin: DEFAULT_SCROLL_REVEAL_MARGIN,
            card_stagger_ms: DEFAULT_CARD_STAGGER_MS,
            marker_delay_ms: DEFAULT_MARKER_DELAY_MS,
            package_item_stagger_ms: DEFAULT_PACKAGE_ITEM_STAGGER_MS,
            skill_stagger_ms: DEFAULT_SKILL_STAGGER_MS,
            skill_fill_delay_ms: DEFAULT_SKILL_FILL_DELAY_MS,
            skill_viewport_check_ms: DEFAULT_SKILL_VIEWPORT_CHECK_MS,
            skill_fallback_ms: DEFAULT_SKILL_FALLBACK_MS,
            skill_load_check_ms: DEFAULT_SKILL_LOAD_CHECK_MS,
            nav_resync_ms: DEFAULT_NAV_RESYNC_MS,
            debug: false,
        }
    }
}

impl MotionConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let pixels = |key: &str, default: f64| parse_f64_with_bounds(&lookup, key, default, PIXEL_BOUNDS);
        let delay = |key: &str, default: u32| parse_u32_with_bounds(&lookup, key, default, DELAY_MS_BOUNDS);

        Self {
            nav_lookahead: pixels("motion-nav-lookahead", defaults.nav_lookahead),
            home_threshold: pixels("motion-home-threshold", defaults.home_threshold),
            home_section: parse_non_empty_string(&lookup, "motion-home-section")
                .unwrap_or(defaults.home_section),
            navbar_threshold: pixels("motion-navbar-threshold", defaults.navbar_threshold),
            parallax_rate: parse_f64_with_bounds(
                &lookup,
                "motion-parallax-rate",
                defaults.parallax_rate,
                PARALLAX_RATE_BOUNDS,
            ),
            reveal_threshold: parse_f64_with_bounds(
                &lookup,
                "motion-reveal-threshold",
                defaults.reveal_threshold,
                THRESHOLD_BOUNDS,
            ),
            reveal_margin: pixels("motion-reveal-margin", defaults.reveal_margin),
            scroll_reveal_margin: pixels("motion-scroll-reveal-margin", defaults.scroll_reveal_margin),
            card_stagger_ms: delay("motion-card-stagger-ms", defaults.card_stagger_ms),
            marker_delay_ms: delay("motion-marker-delay-ms", defaults.marker_delay_ms),
            package_item_stagger_ms: delay(
                "motion-package-item-stagger-ms",
                defaults.package_item_stagger_ms,
            ),
            skill_stagger_ms: delay("motion-skill-stagger-ms", defaults.skill_stagger_ms),
            skill_fill_delay_ms: delay("motion-skill-fill-delay-ms", defaults.skill_fill_delay_ms),
            skill_viewport_check_ms: delay(
                "motion-skill-viewport-check-ms",
                defaults.skill_viewport_check_ms,
            ),
            skill_fallback_ms: delay("motion-skill-fallback-ms", defaults.skill_fallback_ms),
            skill_load_check_ms: delay("motion-skill-load-check-ms", defaults.skill_load_check_ms),
            nav_resync_ms: delay("motion-nav-resync-ms", defaults.nav_resync_ms),
            debug: parse_flag(&lookup, "motion-debug").unwrap_or(defaults.debug),
        }
    }

    /// CSS `rootMargin` for the observers of regular reveal elements.
    pub fn reveal_root_margin(&self) -> String {
        bottom_margin(self.reveal_margin)
    }

    /// CSS `rootMargin` for `.animate-on-scroll` elements.
    pub fn scroll_reveal_root_margin(&self) -> String {
        bottom_margin(self.scroll_reveal_margin)
    }
}

fn bottom_margin(pixels: f64) -> String {
    format!("0px 0px -{pixels}px 0px")
}

fn parse_non_empty_string(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_f64_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: f64,
    bounds: (f64, f64),
) -> f64 {
    lookup(key)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_u32_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
    bounds: (u32, u32),
) -> u32 {
    lookup(key)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    match lookup(key)?.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
