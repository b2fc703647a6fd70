//! Composition-based dispatch over several backends.

use std::sync::Arc;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::if97::If97Model;
use crate::model::FluidModel;
use crate::perfect_gas::PerfectGasModel;
use crate::state::{Saturation, SpecEnthalpy, StateInput, ThermoState};
use cf_core::units::{Pressure, Temperature};

/// Routes each call to the first backend that supports the composition.
#[derive(Clone)]
pub struct RoutedModel {
    backends: Vec<Arc<dyn FluidModel>>,
}

impl RoutedModel {
    pub fn new(backends: Vec<Arc<dyn FluidModel>>) -> Self {
        Self { backends }
    }

    /// IF97 for water, CoolProp for other pure fluids when the `coolprop`
    /// feature is enabled, then perfect gases.
    pub fn standard() -> Self {
        let mut backends: Vec<Arc<dyn FluidModel>> = vec![Arc::new(If97Model::new())];
        #[cfg(feature = "coolprop")]
        backends.push(Arc::new(crate::coolprop::CoolPropModel::new()));
        backends.push(Arc::new(PerfectGasModel::new()));
        Self { backends }
    }

    /// Backend names in dispatch order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    fn backend(&self, comp: &Composition) -> FluidResult<&dyn FluidModel> {
        self.backends
            .iter()
            .find(|b| b.supports_composition(comp))
            .map(|b| b.as_ref())
            .ok_or_else(|| FluidError::NotSupported {
                what: format!("no fluid backend for {comp}"),
            })
    }
}

impl Default for RoutedModel {
    fn default() -> Self {
        Self::standard()
    }
}

impl FluidModel for RoutedModel {
    fn name(&self) -> &str {
        "Routed"
    }

    fn supports_composition(&self, comp: &Composition) -> bool {
        self.backends.iter().any(|b| b.supports_composition(comp))
    }

    fn state(&self, input: StateInput, comp: &Composition) -> FluidResult<ThermoState> {
        self.backend(comp)?.state(input, comp)
    }

    fn saturation_at_p(&self, p: Pressure, comp: &Composition) -> FluidResult<Saturation> {
        self.backend(comp)?.saturation_at_p(p, comp)
    }

    fn saturation_at_t(&self, t: Temperature, comp: &Composition) -> FluidResult<Saturation> {
        self.backend(comp)?.saturation_at_t(t, comp)
    }

    fn isentropic_enthalpy(
        &self,
        from: &ThermoState,
        p_out: Pressure,
        comp: &Composition,
    ) -> FluidResult<SpecEnthalpy> {
        self.backend(comp)?.isentropic_enthalpy(from, p_out, comp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use cf_core::units::{bar, celsius};

    #[test]
    fn dispatches_by_composition() {
        let model = RoutedModel::standard();
        let pt = StateInput::PT {
            p: bar(1.0),
            t: celsius(20.0),
        };
        let water = model.state(pt, &Composition::pure(Species::Water)).unwrap();
        let air = model.state(pt, &Composition::pure(Species::Air)).unwrap();
        assert!(water.density().value > 900.0);
        assert!(air.density().value < 2.0);
    }

    #[test]
    fn water_comes_first() {
        let model = RoutedModel::standard();
        let names = model.backend_names();
        assert_eq!(names.first().copied(), Some("IF97"));
        assert_eq!(names.last().copied(), Some("PerfectGas"));
    }

    #[cfg(not(feature = "coolprop"))]
    #[test]
    fn refrigerants_need_coolprop() {
        let model = RoutedModel::standard();
        assert!(!model.supports_composition(&Composition::pure(Species::R1234yf)));
    }
}
