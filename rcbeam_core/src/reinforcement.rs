//! # Reinforcement Layouts
//!
//! A [`ReinforcementLayout`] is a complete, buildable detailing: tension bar
//! groups by layer, optional compression bars, and stirrups. Bar sizes come
//! from the closed [`BarSize`] catalog, so a layout can never name a bar that
//! does not exist. Layouts are either supplied whole by the caller or produced
//! whole by bar selection; there is no partially populated layout.
//!
//! ## Layer convention
//!
//! Layer 0 is the layer nearest the tension face. Layer indices must be
//! contiguous (0, 1, ...). The same convention applies to compression bars,
//! measured from the compression face.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "tension": [
//!     { "diameter_mm": 25, "count": 3, "layer": 0 },
//!     { "diameter_mm": 20, "count": 2, "layer": 1 }
//!   ],
//!   "compression": [ { "diameter_mm": 16, "count": 2, "layer": 0 } ],
//!   "stirrups": { "diameter_mm": 8, "legs": 2, "spacing_mm": 150.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_positive, CalcError, CalcResult};
use crate::materials::BarSize;

/// Bars of one diameter in one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarGroup {
    #[serde(rename = "diameter_mm")]
    pub bar: BarSize,
    pub count: u32,
    #[serde(default)]
    pub layer: u8,
}

impl BarGroup {
    pub fn new(bar: BarSize, count: u32, layer: u8) -> Self {
        BarGroup { bar, count, layer }
    }

    /// Total steel area of the group (mm²)
    pub fn area_mm2(&self) -> f64 {
        f64::from(self.count) * self.bar.area_mm2()
    }
}

/// Closed stirrups (shear links).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stirrups {
    #[serde(rename = "diameter_mm")]
    pub bar: BarSize,
    /// Number of vertical legs crossing a shear crack
    pub legs: u32,
    pub spacing_mm: f64,
}

impl Stirrups {
    /// Area of all legs in one stirrup, Asv (mm²)
    pub fn leg_area_mm2(&self) -> f64 {
        f64::from(self.legs) * self.bar.area_mm2()
    }
}

/// Bars of one layer, largest diameter first.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub index: u8,
    pub groups: Vec<BarGroup>,
}

impl Layer {
    pub fn bar_count(&self) -> u32 {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn area_mm2(&self) -> f64 {
        self.groups.iter().map(BarGroup::area_mm2).sum()
    }

    /// Largest bar diameter in the layer (mm)
    pub fn largest_diameter(&self) -> f64 {
        self.groups.iter().map(|g| g.bar.diameter()).fold(0.0, f64::max)
    }

    /// Sum of all bar diameters across the layer (mm)
    pub fn total_bar_width(&self) -> f64 {
        self.groups
            .iter()
            .map(|g| f64::from(g.count) * g.bar.diameter())
            .sum()
    }
}

/// Minimum bar spacing rules, driven by the maximum aggregate size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSpacingRules {
    pub aggregate_size_mm: f64,
}

impl BarSpacingRules {
    /// Minimum horizontal clear distance between bars: max(db, agg + 5, 25)
    pub fn min_horizontal_clear(&self, largest_bar_mm: f64) -> f64 {
        largest_bar_mm.max(self.aggregate_size_mm + 5.0).max(25.0)
    }

    /// Minimum vertical clear distance between layers: max(15, ⅔·agg, db)
    pub fn min_vertical_clear(&self, largest_bar_mm: f64) -> f64 {
        largest_bar_mm
            .max(2.0 * self.aggregate_size_mm / 3.0)
            .max(15.0)
    }

    /// Clear spacing between adjacent bars of a layer spread across `available_mm`.
    /// A single bar has no neighbour; its spacing is the full available width.
    pub fn clear_spacing(&self, layer: &Layer, available_mm: f64) -> f64 {
        let n = layer.bar_count();
        if n <= 1 {
            return available_mm - layer.total_bar_width();
        }
        (available_mm - layer.total_bar_width()) / f64::from(n - 1)
    }

    /// Width a layer occupies at minimum clear spacing (mm)
    pub fn required_width(&self, layer: &Layer) -> f64 {
        let gaps = f64::from(layer.bar_count().saturating_sub(1));
        layer.total_bar_width() + gaps * self.min_horizontal_clear(layer.largest_diameter())
    }

    /// Whether the layer fits at minimum clear spacing
    pub fn layer_fits(&self, layer: &Layer, available_mm: f64) -> bool {
        self.required_width(layer) <= available_mm
    }

    /// Distance from the face to the centre of each layer (mm)
    pub fn layer_centres(&self, layers: &[Layer], cover_mm: f64, stirrup_mm: f64) -> Vec<f64> {
        let mut centres = Vec::with_capacity(layers.len());
        let mut previous: Option<(f64, f64)> = None; // (centre, diameter)
        for layer in layers {
            let db = layer.largest_diameter();
            let centre = match previous {
                None => cover_mm + stirrup_mm + db / 2.0,
                Some((prev_centre, prev_db)) => {
                    let gap = self.min_vertical_clear(prev_db.max(db));
                    prev_centre + prev_db / 2.0 + gap + db / 2.0
                }
            };
            centres.push(centre);
            previous = Some((centre, db));
        }
        centres
    }

    /// Distance from the face to the area centroid of the layers (mm)
    pub fn centroid_depth(&self, layers: &[Layer], cover_mm: f64, stirrup_mm: f64) -> f64 {
        let centres = self.layer_centres(layers, cover_mm, stirrup_mm);
        let (moment, area) = layers
            .iter()
            .zip(centres.iter())
            .fold((0.0, 0.0), |(m, a), (layer, &y)| {
                let la = layer.area_mm2();
                (m + la * y, a + la)
            });
        if area > 0.0 {
            moment / area
        } else {
            cover_mm + stirrup_mm
        }
    }
}

impl Default for BarSpacingRules {
    fn default() -> Self {
        BarSpacingRules {
            aggregate_size_mm: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LayoutFields {
    tension: Vec<BarGroup>,
    #[serde(default)]
    compression: Vec<BarGroup>,
    stirrups: Stirrups,
}

/// Complete reinforcement detailing for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutFields")]
pub struct ReinforcementLayout {
    tension: Vec<BarGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compression: Vec<BarGroup>,
    stirrups: Stirrups,
}

impl TryFrom<LayoutFields> for ReinforcementLayout {
    type Error = CalcError;

    fn try_from(f: LayoutFields) -> Result<Self, Self::Error> {
        ReinforcementLayout::new(f.tension, f.compression, f.stirrups)
    }
}

impl ReinforcementLayout {
    /// Build and validate a layout.
    ///
    /// Groups are stored sorted by layer, then largest diameter first.
    ///
    /// ```rust
    /// use rcbeam_core::materials::BarSize;
    /// use rcbeam_core::reinforcement::{BarGroup, ReinforcementLayout, Stirrups};
    ///
    /// let layout = ReinforcementLayout::new(
    ///     vec![BarGroup::new(BarSize::D20, 3, 0)],
    ///     vec![],
    ///     Stirrups { bar: BarSize::D8, legs: 2, spacing_mm: 150.0 },
    /// ).unwrap();
    /// assert!((layout.tension_area_mm2() - 942.48).abs() < 0.01);
    /// ```
    pub fn new(tension: Vec<BarGroup>, compression: Vec<BarGroup>, stirrups: Stirrups) -> CalcResult<Self> {
        if tension.is_empty() {
            return Err(CalcError::missing_field("tension"));
        }
        validate_groups("tension", &tension)?;
        validate_groups("compression", &compression)?;
        if stirrups.legs < 2 {
            return Err(CalcError::invalid_input(
                "stirrups.legs",
                stirrups.legs.to_string(),
                "Closed stirrups need at least 2 legs",
            ));
        }
        ensure_positive("stirrups.spacing_mm", stirrups.spacing_mm)?;

        Ok(ReinforcementLayout {
            tension: sorted_groups(tension),
            compression: sorted_groups(compression),
            stirrups,
        })
    }

    pub fn tension(&self) -> &[BarGroup] {
        &self.tension
    }

    pub fn compression(&self) -> &[BarGroup] {
        &self.compression
    }

    pub fn stirrups(&self) -> Stirrups {
        self.stirrups
    }

    /// Same bars with a different stirrup arrangement
    pub fn with_stirrups(&self, stirrups: Stirrups) -> CalcResult<Self> {
        ReinforcementLayout::new(self.tension.clone(), self.compression.clone(), stirrups)
    }

    /// Total provided tension steel area (mm²)
    pub fn tension_area_mm2(&self) -> f64 {
        self.tension.iter().map(BarGroup::area_mm2).sum()
    }

    /// Total provided compression steel area (mm²)
    pub fn compression_area_mm2(&self) -> f64 {
        self.compression.iter().map(BarGroup::area_mm2).sum()
    }

    /// Total longitudinal steel area (mm²)
    pub fn total_longitudinal_area_mm2(&self) -> f64 {
        self.tension_area_mm2() + self.compression_area_mm2()
    }

    pub fn tension_bar_count(&self) -> u32 {
        self.tension.iter().map(|g| g.count).sum()
    }

    /// Tension bars grouped by layer, nearest the face first
    pub fn tension_layers(&self) -> Vec<Layer> {
        layers_from_groups(&self.tension)
    }

    /// Compression bars grouped by layer, nearest the face first
    pub fn compression_layers(&self) -> Vec<Layer> {
        layers_from_groups(&self.compression)
    }

    /// Smallest longitudinal bar anywhere in the layout
    pub fn smallest_longitudinal_bar(&self) -> BarSize {
        self.tension
            .iter()
            .chain(self.compression.iter())
            .map(|g| g.bar)
            .min()
            .unwrap_or(BarSize::D6)
    }

    /// Number of distinct tension bar diameters
    pub fn distinct_tension_diameters(&self) -> usize {
        let mut sizes: Vec<BarSize> = self.tension.iter().map(|g| g.bar).collect();
        sizes.sort();
        sizes.dedup();
        sizes.len()
    }
}

fn validate_groups(field: &str, groups: &[BarGroup]) -> CalcResult<()> {
    if let Some(group) = groups.iter().find(|g| g.count == 0) {
        return Err(CalcError::invalid_input(
            format!("{}.count", field),
            group.count.to_string(),
            "Bar groups must contain at least one bar",
        ));
    }
    if groups.is_empty() {
        return Ok(());
    }
    let max_layer = groups.iter().map(|g| g.layer).max().unwrap_or(0);
    for layer in 0..=max_layer {
        if !groups.iter().any(|g| g.layer == layer) {
            return Err(CalcError::invalid_input(
                format!("{}.layer", field),
                layer.to_string(),
                "Layer indices must be contiguous starting at 0",
            ));
        }
    }
    Ok(())
}

fn sorted_groups(mut groups: Vec<BarGroup>) -> Vec<BarGroup> {
    groups.sort_by(|a, b| a.layer.cmp(&b.layer).then(b.bar.cmp(&a.bar)));
    groups
}

/// Group bar groups (sorted by layer) into layers
pub fn layers_from_groups(groups: &[BarGroup]) -> Vec<Layer> {
    let mut layers: Vec<Layer> = Vec::new();
    for group in groups {
        match layers.last_mut() {
            Some(layer) if layer.index == group.layer => layer.groups.push(*group),
            _ => layers.push(Layer {
                index: group.layer,
                groups: vec![*group],
            }),
        }
    }
    layers
}
