//! Entity overlay: settlements and creatures drawn as circles on top of the
//! composited map, styled by a small rule table.

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::colorize::Rgb;
use crate::engine::{CreatureRecord, SettlementEntity};

/// Which glyph attribute a [`StyleRule`] tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleAttribute {
    Diet,
    Energy,
    Size,
    /// 1.0 for capitals, 0.0 otherwise.
    Capital,
}

/// Outline every glyph whose `attribute` is strictly above `threshold`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub attribute: StyleAttribute,
    pub threshold: f32,
    pub outline: Rgb,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Floor applied after scaling, in screen pixels.
    pub min_radius: f64,
    /// Cap applied after scaling, in screen pixels.
    pub max_radius: f64,
    /// World units of radius per unit of creature size.
    pub creature_size_factor: f64,
    /// World units of radius per sqrt(population).
    pub settlement_size_factor: f64,
    pub outline_thickness: f64,
    pub rules: Vec<StyleRule>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_radius: 1.5,
            max_radius: 60.0,
            creature_size_factor: 0.4,
            settlement_size_factor: 0.05,
            outline_thickness: 1.0,
            rules: vec![
                StyleRule {
                    attribute: StyleAttribute::Diet,
                    threshold: 0.6,
                    outline: [255, 0, 0],
                },
                StyleRule {
                    attribute: StyleAttribute::Capital,
                    threshold: 0.5,
                    outline: [255, 255, 255],
                },
            ],
        }
    }
}

/// Resolved drawing instructions for one entity, in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: Rgb,
    pub outline: Option<Rgb>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub drawn: usize,
    pub culled: usize,
}

pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn settlement_glyph(&self, settlement: &SettlementEntity, camera: &Camera) -> Glyph {
        // Settlements sit at the centre of their tile.
        let (x, y) = camera.world_to_screen(settlement.x as f64 + 0.5, settlement.y as f64 + 0.5);
        let size = (settlement.population as f64).sqrt();
        let radius = self.radius(size * self.config.settlement_size_factor, camera);
        let attributes = |attribute: StyleAttribute| match attribute {
            StyleAttribute::Capital => Some(if settlement.capital { 1.0 } else { 0.0 }),
            StyleAttribute::Size => Some(size as f32),
            StyleAttribute::Diet | StyleAttribute::Energy => None,
        };
        Glyph {
            x,
            y,
            radius,
            fill: settlement.color,
            outline: self.outline_for(attributes),
        }
    }

    pub fn creature_glyph(&self, creature: &CreatureRecord, camera: &Camera) -> Glyph {
        let (x, y) = camera.world_to_screen(creature.x as f64, creature.y as f64);
        let radius = self.radius(creature.size.max(0.0) as f64 * self.config.creature_size_factor, camera);
        let attributes = |attribute: StyleAttribute| match attribute {
            StyleAttribute::Diet => Some(creature.diet),
            StyleAttribute::Energy => Some(creature.energy),
            StyleAttribute::Size => Some(creature.size),
            StyleAttribute::Capital => None,
        };
        Glyph {
            x,
            y,
            radius,
            fill: creature.color,
            outline: self.outline_for(attributes),
        }
    }

    fn radius(&self, world_radius: f64, camera: &Camera) -> f64 {
        let radius = world_radius * camera.scale();
        if radius.is_finite() {
            radius.min(self.config.max_radius).max(self.config.min_radius)
        } else {
            self.config.min_radius
        }
    }

    /// First matching rule wins.
    fn outline_for(&self, value_of: impl Fn(StyleAttribute) -> Option<f32>) -> Option<Rgb> {
        self.config
            .rules
            .iter()
            .find(|rule| value_of(rule.attribute).is_some_and(|v| v > rule.threshold))
            .map(|rule| rule.outline)
    }

    /// Draw one glyph unless it lies entirely off the canvas.
    pub fn draw_glyph(&self, canvas: &mut Canvas, glyph: &Glyph) -> bool {
        let (w, h) = canvas.size();
        let r = glyph.radius + self.config.outline_thickness;
        if glyph.x + r < 0.0 || glyph.y + r < 0.0 || glyph.x - r >= w as f64 || glyph.y - r >= h as f64 {
            return false;
        }
        canvas.fill_circle(glyph.x, glyph.y, glyph.radius, glyph.fill);
        if let Some(outline) = glyph.outline {
            canvas.stroke_circle(glyph.x, glyph.y, glyph.radius, self.config.outline_thickness, outline);
        }
        true
    }

    pub fn draw(
        &self,
        canvas: &mut Canvas,
        camera: &Camera,
        settlements: &[SettlementEntity],
        creatures: &[CreatureRecord],
    ) -> OverlayStats {
        let mut stats = OverlayStats::default();
        if !self.config.enabled {
            return stats;
        }
        let glyphs = creatures
            .iter()
            .map(|c| self.creature_glyph(c, camera))
            .chain(settlements.iter().map(|s| self.settlement_glyph(s, camera)));
        for glyph in glyphs {
            if self.draw_glyph(canvas, &glyph) {
                stats.drawn += 1;
            } else {
                stats.culled += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;

    fn creature(x: f32, y: f32, size: f32, diet: f32) -> CreatureRecord {
        CreatureRecord {
            x,
            y,
            color: [10, 200, 10],
            size,
            diet,
            energy: 50.0,
        }
    }

    fn settlement(capital: bool) -> SettlementEntity {
        SettlementEntity {
            id: 1,
            name: "Ardan".to_string(),
            x: 3,
            y: 2,
            population: 400,
            nation_id: Some(1),
            color: [90, 90, 200],
            capital,
        }
    }

    #[test]
    fn test_radius_is_monotonic_with_floor() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let camera = Camera::with_state(&CameraConfig::default(), 4.0, 0.0, 0.0);
        let mut last = 0.0;
        for size in [0.0, 0.1, 0.5, 1.0, 2.0, 5.0] {
            let glyph = renderer.creature_glyph(&creature(1.0, 1.0, size, 0.2), &camera);
            assert!(glyph.radius >= renderer.config().min_radius);
            assert!(glyph.radius >= last);
            last = glyph.radius;
        }
    }

    #[test]
    fn test_large_settlement_radius_is_capped_at_max_zoom() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let camera = Camera::with_state(&CameraConfig::default(), 40.0, 0.0, 0.0);
        let mut city = settlement(false);
        city.population = 250_000;
        let glyph = renderer.settlement_glyph(&city, &camera);
        assert_eq!(glyph.radius, renderer.config().max_radius);
    }

    #[test]
    fn test_style_rules_outline_carnivores_and_capitals() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let camera = Camera::default();
        assert_eq!(renderer.creature_glyph(&creature(0.0, 0.0, 1.0, 0.9), &camera).outline, Some([255, 0, 0]));
        assert_eq!(renderer.creature_glyph(&creature(0.0, 0.0, 1.0, 0.6), &camera).outline, None);
        assert_eq!(renderer.settlement_glyph(&settlement(true), &camera).outline, Some([255, 255, 255]));
        assert_eq!(renderer.settlement_glyph(&settlement(false), &camera).outline, None);
    }

    #[test]
    fn test_settlement_drawn_at_tile_centre() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let camera = Camera::with_state(&CameraConfig::default(), 10.0, 5.0, 0.0);
        let glyph = renderer.settlement_glyph(&settlement(false), &camera);
        assert_eq!((glyph.x, glyph.y), (40.0, 25.0));
    }

    #[test]
    fn test_offscreen_glyphs_are_culled() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let camera = Camera::with_state(&CameraConfig::default(), 4.0, 0.0, 0.0);
        let mut canvas = Canvas::new(40, 40, [0, 0, 0]);
        let creatures = [creature(2.0, 2.0, 1.0, 0.2), creature(500.0, 2.0, 1.0, 0.2), creature(-30.0, -30.0, 1.0, 0.9)];
        let stats = renderer.draw(&mut canvas, &camera, &[], &creatures);
        assert_eq!(stats, OverlayStats { drawn: 1, culled: 2 });
        assert_eq!(canvas.get(8, 8), Some([10, 200, 10]));
    }
}
