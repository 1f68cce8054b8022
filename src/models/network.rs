//! Полносвязная сеть для регрессии AQI

use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Identity,
}

impl Activation {
    fn apply(&self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Identity => z.clone(),
        }
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Identity => Array2::ones(z.raw_dim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    /// He-uniform инициализация
    fn new<R: Rng>(inputs: usize, outputs: usize, activation: Activation, rng: &mut R) -> Self {
        let limit = (6.0 / inputs as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        Self {
            weights: Array2::from_shape_fn((inputs, outputs), |_| dist.sample(&mut *rng)),
            bias: Array1::zeros(outputs),
            activation,
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }
}

/// Градиенты одного слоя
#[derive(Debug, Clone)]
pub struct LayerGradient {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

/// Промежуточные значения прямого прохода, нужные для backprop
pub struct ForwardCache {
    /// Вход каждого слоя; последний элемент это выход сети
    activations: Vec<Array2<f64>>,
    /// Линейная часть `a·W + b` каждого слоя
    pre_activations: Vec<Array2<f64>>,
}

impl ForwardCache {
    pub fn output(&self) -> &Array2<f64> {
        &self.activations[self.activations.len() - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedForwardNetwork {
    layers: Vec<DenseLayer>,
}

impl FeedForwardNetwork {
    /// `input → hidden… → 1`: ReLU на скрытых слоях, линейный выход
    pub fn new<R: Rng>(input_size: usize, hidden_layers: &[usize], rng: &mut R) -> Self {
        let mut layers = Vec::with_capacity(hidden_layers.len() + 1);
        let mut fan_in = input_size;
        for &width in hidden_layers {
            layers.push(DenseLayer::new(fan_in, width, Activation::Relu, rng));
            fan_in = width;
        }
        layers.push(DenseLayer::new(fan_in, 1, Activation::Identity, rng));
        Self { layers }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(DenseLayer::inputs).unwrap_or(0)
    }

    /// Ширины слоев, включая вход и выход
    pub fn architecture(&self) -> Vec<usize> {
        let mut sizes = vec![self.input_size()];
        sizes.extend(self.layers.iter().map(DenseLayer::outputs));
        sizes
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.bias.len())
            .sum()
    }

    pub fn forward(&self, x: &Array2<f64>) -> ForwardCache {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut current = x.to_owned();

        for layer in &self.layers {
            let z = current.dot(&layer.weights) + &layer.bias;
            let next = layer.activation.apply(&z);
            activations.push(std::mem::replace(&mut current, next));
            pre_activations.push(z);
        }
        activations.push(current);

        ForwardCache {
            activations,
            pre_activations,
        }
    }

    /// Предсказания в масштабированных единицах, по одному на строку
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        self.forward(x).output().column(0).to_owned()
    }

    /// Градиенты MSE (+ L2) по всем параметрам
    pub fn backward(&self, cache: &ForwardCache, y: &Array1<f64>, l2_penalty: f64) -> Vec<LayerGradient> {
        let n = y.len().max(1) as f64;
        let prediction = cache.output();
        let target = y.view().insert_axis(Axis(1));

        // dL/dŷ для L = mean((ŷ - y)²)
        let mut grad = (prediction - &target) * (2.0 / n);
        let mut gradients = Vec::with_capacity(self.layers.len());

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let delta = grad * layer.activation.derivative(&cache.pre_activations[i]);
            let input = &cache.activations[i];

            let mut weights = input.t().dot(&delta);
            if l2_penalty > 0.0 {
                weights.scaled_add(l2_penalty, &layer.weights);
            }
            let bias = delta.sum_axis(Axis(0));

            grad = delta.dot(&layer.weights.t());
            gradients.push(LayerGradient { weights, bias });
        }

        gradients.reverse();
        gradients
    }

    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }
}

pub fn mean_squared_error(prediction: &Array1<f64>, target: &Array1<f64>) -> f64 {
    let n = target.len();
    if n == 0 {
        return 0.0;
    }
    prediction
        .iter()
        .zip(target.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum::<f64>()
        / n as f64
}
