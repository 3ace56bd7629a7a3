use super::DistanceMetric;

#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Fixed dimensionality; when `None` the first insert decides it.
    pub vector_dimensions: Option<usize>,
    pub distance_metric: DistanceMetric,
}

impl CollectionConfig {
    pub fn new(vector_dimensions: Option<usize>) -> Self {
        Self {
            vector_dimensions,
            distance_metric: DistanceMetric::Cosine,
        }
    }

    pub fn with_distance_metric(mut self, distance_metric: DistanceMetric) -> Self {
        self.distance_metric = distance_metric;
        self
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::new(None)
    }
}
