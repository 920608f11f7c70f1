//! # Bar Selection
//!
//! Maps a required steel area to a buildable set of bar groups drawn from a
//! discrete catalog, and details a whole section for design mode.
//!
//! ## Candidate layouts
//!
//! A layout uses either one diameter (at least two bars) or two diameters
//! (at least two of the larger and one of the smaller). Bars are placed
//! largest first, filling layer 0 to its width capacity before starting the
//! next layer. A placement is feasible when it uses no more layers than the
//! current cap, every layer holds at least two bars, and the clear spacing of
//! layer 0 does not exceed the crack-control maximum (when one applies).
//!
//! ## Ordering
//!
//! Layer caps are tried in increasing order (1, 2, ... max_layers). Within a
//! cap the selected layout is the minimum, lexicographically, of:
//!
//! 1. total area, compared exactly as the integer Σ n·d²
//! 2. number of distinct diameters
//! 3. total number of bars
//! 4. larger diameter, its count, smaller diameter, its count
//!
//! Because the area key is exact, two layouts with equal area always fall
//! through to the later keys and the result never depends on float rounding.

use serde::{Deserialize, Serialize};

use crate::checks::ductility;
use crate::checks::flexure::{self, ReinforcementMode, DEFAULT_COMPRESSION_BAR_OFFSET_MM};
use crate::checks::shear;
use crate::code_tables::crack_control_max_spacing;
use crate::config::EngineConfig;
use crate::errors::CalcResult;
use crate::loads::LoadDemand;
use crate::materials::BarSize;
use crate::reinforcement::{layers_from_groups, BarGroup, BarSpacingRules, ReinforcementLayout, Stirrups};
use crate::section::BeamSection;

/// Effective depth refinement passes in design mode
pub const MAX_DEPTH_PASSES: usize = 4;

/// No catalog layout carries the required area within the constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoFeasibleLayout {
    pub required_mm2: f64,
    /// Largest area any feasible layout reaches
    pub max_achievable_mm2: f64,
}

/// Ordering key of a candidate layout
type LayoutKey = (u64, usize, u32, u32, u32, u32, u32);

/// One- or two-diameter bar mix, largest diameter first
#[derive(Debug, Clone, Copy, PartialEq)]
struct BarMix {
    large: (BarSize, u32),
    small: Option<(BarSize, u32)>,
}

impl BarMix {
    fn area_mm2(&self) -> f64 {
        let small = self.small.map_or(0.0, |(b, n)| f64::from(n) * b.area_mm2());
        f64::from(self.large.1) * self.large.0.area_mm2() + small
    }

    fn key(&self) -> LayoutKey {
        let (lb, ln) = self.large;
        let (sb, sn) = self.small.map_or((0, 0), |(b, n)| (b.diameter_mm(), n));
        let area_key =
            u64::from(ln) * lb.area_key() + self.small.map_or(0, |(b, n)| u64::from(n) * b.area_key());
        let distinct = if self.small.is_some() { 2 } else { 1 };
        (area_key, distinct, ln + sn, lb.diameter_mm(), ln, sb, sn)
    }

    fn bars(&self) -> impl Iterator<Item = BarSize> + '_ {
        let large = std::iter::repeat(self.large.0).take(self.large.1 as usize);
        let small = self
            .small
            .into_iter()
            .flat_map(|(b, n)| std::iter::repeat(b).take(n as usize));
        large.chain(small)
    }
}

/// Running width of a layer under construction
#[derive(Debug, Clone, Copy)]
struct LayerFill {
    bar_width: f64,
    count: u32,
    min_clear: f64,
}

/// Bar selection constraints for one face of one section.
#[derive(Debug, Clone)]
pub struct BarSelector {
    catalog: Vec<BarSize>,
    available_width_mm: f64,
    max_layers: u8,
    max_clear_spacing_mm: Option<f64>,
    rules: BarSpacingRules,
}

impl BarSelector {
    /// `catalog` is sorted and deduplicated here; `available_width_mm` is the
    /// clear width between stirrup legs.
    pub fn new(
        catalog: &[BarSize],
        available_width_mm: f64,
        max_layers: u8,
        max_clear_spacing_mm: Option<f64>,
        rules: BarSpacingRules,
    ) -> Self {
        let mut catalog = catalog.to_vec();
        catalog.sort();
        catalog.dedup();
        BarSelector {
            catalog,
            available_width_mm,
            max_layers,
            max_clear_spacing_mm,
            rules,
        }
    }

    /// Most bars of one size that fit in a single layer
    fn per_layer_capacity(&self, bar: BarSize) -> u32 {
        let db = bar.diameter();
        let s = self.rules.min_horizontal_clear(db);
        let n = ((self.available_width_mm + s) / (db + s)).floor();
        if n.is_finite() && n > 0.0 {
            n as u32
        } else {
            0
        }
    }

    fn max_bars(&self, bar: BarSize) -> u32 {
        self.per_layer_capacity(bar) * u32::from(self.max_layers)
    }

    /// Place a mix largest first; returns layers as bar groups if feasible.
    fn place(&self, mix: &BarMix, layer_cap: u8) -> Option<Vec<BarGroup>> {
        let mut fills: Vec<LayerFill> = Vec::new();
        let mut groups: Vec<BarGroup> = Vec::new();
        for bar in mix.bars() {
            let db = bar.diameter();
            let fits = fills.last().is_some_and(|f| f.bar_width + f.min_clear + db <= self.available_width_mm);
            if fits {
                if let Some(fill) = fills.last_mut() {
                    fill.bar_width += db;
                    fill.count += 1;
                }
            } else {
                if db > self.available_width_mm || fills.len() >= usize::from(layer_cap) {
                    return None;
                }
                fills.push(LayerFill {
                    bar_width: db,
                    count: 1,
                    min_clear: self.rules.min_horizontal_clear(db),
                });
            }
            let layer = (fills.len() - 1) as u8;
            match groups.last_mut() {
                Some(g) if g.layer == layer && g.bar == bar => g.count += 1,
                _ => groups.push(BarGroup::new(bar, 1, layer)),
            }
        }

        if fills.iter().any(|f| f.count < 2) {
            return None;
        }
        if let (Some(limit), Some(first)) = (self.max_clear_spacing_mm, fills.first()) {
            let clear = (self.available_width_mm - first.bar_width) / f64::from(first.count - 1);
            if clear > limit {
                return None;
            }
        }
        Some(groups)
    }

    /// Every one- and two-diameter mix within the per-size bar limits
    fn mixes(&self) -> Vec<BarMix> {
        let mut mixes = Vec::new();
        for (i, &large) in self.catalog.iter().enumerate() {
            for n in 2..=self.max_bars(large) {
                mixes.push(BarMix {
                    large: (large, n),
                    small: None,
                });
            }
            for &small in &self.catalog[..i] {
                for n1 in 2..=self.max_bars(large) {
                    for n2 in 1..=self.max_bars(small) {
                        mixes.push(BarMix {
                            large: (large, n1),
                            small: Some((small, n2)),
                        });
                    }
                }
            }
        }
        mixes
    }

    /// Smallest-key feasible mix carrying `required_mm2` within `layer_cap` layers.
    fn best_within(&self, required_mm2: f64, layer_cap: u8) -> Option<(LayoutKey, Vec<BarGroup>)> {
        let mut best: Option<(LayoutKey, Vec<BarGroup>)> = None;
        let mut consider = |mix: BarMix| -> bool {
            if mix.area_mm2() < required_mm2 {
                return false;
            }
            match self.place(&mix, layer_cap) {
                Some(groups) => {
                    let key = mix.key();
                    if best.as_ref().map_or(true, |(k, _)| key < *k) {
                        best = Some((key, groups));
                    }
                    true
                }
                None => false,
            }
        };

        // For a fixed leading count, area grows with the trailing count, so the
        // first feasible trailing count is the best for that leading count.
        for (i, &large) in self.catalog.iter().enumerate() {
            for n in 2..=self.max_bars(large) {
                if consider(BarMix {
                    large: (large, n),
                    small: None,
                }) {
                    break;
                }
            }
            for &small in &self.catalog[..i] {
                for n1 in 2..=self.max_bars(large) {
                    for n2 in 1..=self.max_bars(small) {
                        if consider(BarMix {
                            large: (large, n1),
                            small: Some((small, n2)),
                        }) {
                            break;
                        }
                    }
                }
            }
        }
        best
    }

    /// Select bars for a required area.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcbeam_core::bar_selection::BarSelector;
    /// use rcbeam_core::materials::BarSize;
    /// use rcbeam_core::reinforcement::BarSpacingRules;
    ///
    /// let selector = BarSelector::new(
    ///     &[BarSize::D12, BarSize::D16, BarSize::D20, BarSize::D25],
    ///     234.0,
    ///     2,
    ///     Some(180.0),
    ///     BarSpacingRules::default(),
    /// );
    /// let groups = selector.select(900.0).unwrap();
    /// let area: f64 = groups.iter().map(|g| g.area_mm2()).sum();
    /// assert!(area >= 900.0);
    /// ```
    pub fn select(&self, required_mm2: f64) -> Result<Vec<BarGroup>, NoFeasibleLayout> {
        for cap in 1..=self.max_layers {
            if let Some((_, groups)) = self.best_within(required_mm2, cap) {
                return Ok(groups);
            }
        }
        Err(NoFeasibleLayout {
            required_mm2,
            max_achievable_mm2: self.max_achievable_mm2(),
        })
    }

    /// Largest area of any feasible layout
    pub fn max_achievable_mm2(&self) -> f64 {
        self.mixes()
            .into_iter()
            .filter(|mix| self.place(mix, self.max_layers).is_some())
            .map(|mix| mix.area_mm2())
            .fold(0.0, f64::max)
    }
}

/// A section whose effective depth agrees with its selected layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedSection {
    pub section: BeamSection,
    pub layout: ReinforcementLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailingOutcome {
    Detailed(DetailedSection),
    Infeasible(NoFeasibleLayout),
}

/// Detail a section for design mode.
///
/// Starts from d = D − cover − stirrup − 10 mm, selects tension (and, when
/// needed and permitted, compression) bars, recomputes d from the tension
/// centroid and repeats until the layout stops changing or
/// [`MAX_DEPTH_PASSES`] is reached. The returned section carries the
/// effective depth implied by the returned layout. Stirrup spacing is the
/// shear design spacing, capped by the ductile limit when requested.
pub fn detail_section(
    base: &BeamSection,
    demand: &LoadDemand,
    ductility_enabled: bool,
    config: &EngineConfig,
) -> CalcResult<DetailingOutcome> {
    let rules = config.spacing_rules();
    let stirrup = config.bars.stirrup;
    let ds = stirrup.diameter();
    let cover = base.clear_cover_mm();
    let depth = base.overall_depth_mm();
    let available = base.clear_width_inside_stirrups_mm(ds);
    let catalog = config.longitudinal_catalog();
    let tension_selector = BarSelector::new(
        &catalog,
        available,
        config.bars.max_layers,
        Some(crack_control_max_spacing(base.steel())),
        rules,
    );
    let compression_selector = BarSelector::new(&catalog, available, config.bars.max_layers, None, rules);

    let mut d = depth - cover - ds - DEFAULT_COMPRESSION_BAR_OFFSET_MM;
    let mut d_prime = flexure::default_compression_depth_mm(base, ds);
    let mut required = 0.0;
    let mut bars: Option<(Vec<BarGroup>, Vec<BarGroup>)> = None;

    for _ in 0..MAX_DEPTH_PASSES {
        let Ok(section) = base.with_effective_depth(d) else {
            return Ok(DetailingOutcome::Infeasible(NoFeasibleLayout {
                required_mm2: required,
                max_achievable_mm2: 0.0,
            }));
        };
        let design = flexure::design(&section, demand.moment_knm(), d_prime);
        required = design.required_tension_mm2.max(design.minimum_tension_mm2);
        if ductility_enabled {
            required = required.max(ductility::min_tension_mm2(&section, &config.ductility));
        }

        let tension = match tension_selector.select(required) {
            Ok(groups) => groups,
            Err(infeasible) => return Ok(DetailingOutcome::Infeasible(infeasible)),
        };
        let compression = if design.mode == ReinforcementMode::Doubly && config.flexure.allow_doubly_reinforced {
            match compression_selector.select(design.required_compression_mm2) {
                Ok(groups) => groups,
                Err(infeasible) => return Ok(DetailingOutcome::Infeasible(infeasible)),
            }
        } else {
            Vec::new()
        };

        let d_next = depth - rules.centroid_depth(&layers_from_groups(&tension), cover, ds);
        let d_prime_next = if compression.is_empty() {
            flexure::default_compression_depth_mm(base, ds)
        } else {
            rules.centroid_depth(&layers_from_groups(&compression), cover, ds)
        };
        let stable = (d_next - d).abs() < 1e-9 && (d_prime_next - d_prime).abs() < 1e-9;
        d = d_next;
        d_prime = d_prime_next;
        bars = Some((tension, compression));
        if stable {
            break;
        }
    }

    let (Some((tension, compression)), Ok(section)) = (bars, base.with_effective_depth(d)) else {
        return Ok(DetailingOutcome::Infeasible(NoFeasibleLayout {
            required_mm2: required,
            max_achievable_mm2: 0.0,
        }));
    };

    let provided: f64 = tension.iter().map(BarGroup::area_mm2).sum();
    let shear = shear::design(&section, demand, provided, stirrup, config.bars.stirrup_legs, &config.shear);
    let mut spacing = match shear.design_spacing_mm {
        Some(s) if s > 0.0 => s,
        _ => config.shear.min_spacing_mm,
    };
    if ductility_enabled {
        let smallest = tension
            .iter()
            .chain(compression.iter())
            .map(|g| g.bar)
            .min()
            .unwrap_or(stirrup);
        let cap = ductility::max_stirrup_spacing_mm(section.effective_depth_mm(), smallest.diameter(), &config.ductility);
        let step = config.shear.spacing_step_mm;
        let rounded = (cap / step).floor() * step;
        spacing = spacing.min(if rounded > 0.0 { rounded } else { cap });
    }

    let layout = ReinforcementLayout::new(
        tension,
        compression,
        Stirrups {
            bar: stirrup,
            legs: config.bars.stirrup_legs,
            spacing_mm: spacing,
        },
    )?;
    Ok(DetailingOutcome::Detailed(DetailedSection { section, layout }))
}
