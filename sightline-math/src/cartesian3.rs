use bevy::math::DVec3;

use crate::epsilon::equals_epsilon;

/// Cesium-flavoured helpers on top of `DVec3`.
pub trait Cartesian3 {
    fn equals_epsilon(
        &self,
        right: DVec3,
        relative_epsilon: Option<f64>,
        absolute_epsilon: Option<f64>,
    ) -> bool;
    fn multiply_components(&self, right: &DVec3) -> DVec3;
}

impl Cartesian3 for DVec3 {
    fn equals_epsilon(
        &self,
        right: DVec3,
        relative_epsilon: Option<f64>,
        absolute_epsilon: Option<f64>,
    ) -> bool {
        *self == right
            || equals_epsilon(self.x, right.x, relative_epsilon, absolute_epsilon)
                && equals_epsilon(self.y, right.y, relative_epsilon, absolute_epsilon)
                && equals_epsilon(self.z, right.z, relative_epsilon, absolute_epsilon)
    }
    fn multiply_components(&self, right: &DVec3) -> DVec3 {
        DVec3::new(self.x * right.x, self.y * right.y, self.z * right.z)
    }
}
