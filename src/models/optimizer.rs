//! Adam-оптимизатор для FeedForwardNetwork

use ndarray::{Array1, Array2, Zip};

use super::network::{FeedForwardNetwork, LayerGradient};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

struct Moments {
    m_weights: Array2<f64>,
    v_weights: Array2<f64>,
    m_bias: Array1<f64>,
    v_bias: Array1<f64>,
}

pub struct Adam {
    learning_rate: f64,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new(network: &FeedForwardNetwork, learning_rate: f64) -> Self {
        let moments = network
            .layers()
            .iter()
            .map(|layer| Moments {
                m_weights: Array2::zeros(layer.weights.raw_dim()),
                v_weights: Array2::zeros(layer.weights.raw_dim()),
                m_bias: Array1::zeros(layer.bias.raw_dim()),
                v_bias: Array1::zeros(layer.bias.raw_dim()),
            })
            .collect();

        Self {
            learning_rate,
            step: 0,
            moments,
        }
    }

    pub fn step(&mut self, network: &mut FeedForwardNetwork, gradients: &[LayerGradient]) {
        self.step = self.step.saturating_add(1);
        let correction1 = 1.0 - BETA1.powi(self.step);
        let correction2 = 1.0 - BETA2.powi(self.step);
        let lr = self.learning_rate;

        for ((layer, grad), state) in network
            .layers_mut()
            .iter_mut()
            .zip(gradients)
            .zip(self.moments.iter_mut())
        {
            Zip::from(&mut layer.weights)
                .and(&grad.weights)
                .and(&mut state.m_weights)
                .and(&mut state.v_weights)
                .for_each(|w, &g, m, v| update(w, g, m, v, lr, correction1, correction2));

            Zip::from(&mut layer.bias)
                .and(&grad.bias)
                .and(&mut state.m_bias)
                .and(&mut state.v_bias)
                .for_each(|b, &g, m, v| update(b, g, m, v, lr, correction1, correction2));
        }
    }
}

#[inline]
fn update(param: &mut f64, grad: f64, m: &mut f64, v: &mut f64, lr: f64, c1: f64, c2: f64) {
    *m = BETA1 * *m + (1.0 - BETA1) * grad;
    *v = BETA2 * *v + (1.0 - BETA2) * grad * grad;
    let m_hat = *m / c1;
    let v_hat = *v / c2;
    *param -= lr * m_hat / (v_hat.sqrt() + EPSILON);
}
