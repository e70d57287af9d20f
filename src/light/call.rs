//! Fluent command builder for requesting a new light state.

use super::state::LightState;
use super::traits::ColorCapability;
use log::{debug, warn};
use std::time::Duration;

/// A request to change a light, built with chained setters and applied
/// with [`LightCall::perform`].
///
/// Fields that are not set keep the light's current target value.
///
/// # Example
/// ```ignore
/// light.make_call().set_brightness(0.5).set_save(true).perform();
/// light.turn_off().perform();
/// ```
#[must_use = "a LightCall does nothing until perform() is called"]
pub struct LightCall<'a> {
    light: &'a LightState,
    state: Option<bool>,
    brightness: Option<f32>,
    color_temperature: Option<f32>,
    transition_length: Option<Duration>,
    save: bool,
}

impl<'a> LightCall<'a> {
    pub(crate) fn new(light: &'a LightState) -> Self {
        Self {
            light,
            state: None,
            brightness: None,
            color_temperature: None,
            transition_length: None,
            save: false,
        }
    }

    pub fn set_state(mut self, state: bool) -> Self {
        self.state = Some(state);
        self
    }

    /// Brightness as a fraction in `[0.0, 1.0]`. Out of range values are clamped.
    pub fn set_brightness(mut self, brightness: f32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Color temperature in mireds, clamped to the light's supported range.
    pub fn set_color_temperature(mut self, mireds: f32) -> Self {
        self.color_temperature = Some(mireds);
        self
    }

    /// Override the light's default transition length for this call.
    pub fn set_transition_length(mut self, length: Duration) -> Self {
        self.transition_length = Some(length);
        self
    }

    /// Request that the resulting state is remembered as the saved state.
    pub fn set_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    /// Validate the request against the light's traits and apply it.
    pub fn perform(self) {
        let light = self.light;
        let traits = light.traits();
        let mut target = light.remote_values();

        if let Some(state) = self.state {
            target.state = state;
        }

        if let Some(brightness) = self.brightness {
            if !traits.supports(ColorCapability::Brightness) {
                warn!("'{}': setting brightness not supported", light.name());
            } else if !brightness.is_finite() {
                warn!("'{}': ignoring brightness {}", light.name(), brightness);
            } else {
                target.brightness = brightness.clamp(0.0, 1.0);
            }
        }

        if let Some(mireds) = self.color_temperature {
            if !traits.supports(ColorCapability::ColorTemperature) {
                warn!("'{}': setting color temperature not supported", light.name());
            } else if !mireds.is_finite() {
                warn!("'{}': ignoring color temperature {}", light.name(), mireds);
            } else {
                target.color_temperature = mireds.clamp(traits.min_mireds(), traits.max_mireds());
            }
        }

        let transition = self
            .transition_length
            .unwrap_or_else(|| light.default_transition());

        debug!(
            "'{}': state={} brightness={:.2} color_temperature={:.0} transition={:?} save={}",
            light.name(),
            target.state,
            target.brightness,
            target.color_temperature,
            transition,
            self.save
        );

        light.apply(target, transition, self.save);
    }
}

#[cfg(test)]
mod tests {
    use crate::light::{ColorCapability, LightColorValues, LightState, LightTraits};

    fn dimmable() -> LightState {
        LightState::new("Desk Lamp", LightTraits::brightness())
    }

    #[test]
    fn test_unset_fields_keep_target() {
        let light = dimmable();
        light.make_call().set_brightness(0.3).perform();
        light.turn_on().perform();

        let values = light.current_values();
        assert!(values.state);
        assert!((values.brightness - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_brightness_is_clamped() {
        let light = dimmable();
        light.make_call().set_brightness(1.7).perform();
        assert_eq!(light.current_values().brightness, 1.0);

        light.make_call().set_brightness(-0.2).perform();
        assert_eq!(light.current_values().brightness, 0.0);
    }

    #[test]
    fn test_unsupported_brightness_is_ignored() {
        let light = LightState::new("Relay", LightTraits::on_off());
        let before = light.current_values().brightness;
        light.make_call().set_brightness(0.1).perform();
        assert_eq!(light.current_values().brightness, before);
    }

    #[test]
    fn test_color_temperature_is_clamped_to_range() {
        let traits = LightTraits::brightness()
            .with(ColorCapability::ColorTemperature)
            .with_mireds(150.0, 400.0);
        let light = LightState::new("Ceiling", traits);

        light.make_call().set_color_temperature(500.0).perform();
        assert_eq!(light.current_values().color_temperature, 400.0);

        light.make_call().set_color_temperature(250.0).perform();
        assert_eq!(light.current_values().color_temperature, 250.0);
    }

    #[test]
    fn test_save_records_saved_values() {
        let light = dimmable();
        assert!(light.saved_values().is_none());

        light.turn_on().perform();
        assert!(light.saved_values().is_none());

        light.make_call().set_brightness(0.6).set_save(true).perform();
        let saved = light.saved_values().unwrap();
        assert_eq!(
            saved,
            LightColorValues {
                state: true,
                brightness: 0.6,
                ..LightColorValues::default()
            }
        );
    }
}
