use crate::error::{check_len, Result, RlError};
use ml::{Activation, Dense, Graph, Optimizer, Recorder, Tape, Tensor};

/// Builds a [`FunctionApproximator`] from an ordered list of layer widths.
///
/// ```
/// # use rl::ApproximatorBuilder;
/// let mut rng = fastrand::Rng::with_seed(0);
/// let net = ApproximatorBuilder::new(4).layers(&[100, 50, 1]).build(&mut rng).unwrap();
/// assert_eq!(net.output_dim(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ApproximatorBuilder {
    input_dim: usize,
    widths: Vec<usize>,
    activation: Activation,
    init_range: f32,
}

impl ApproximatorBuilder {
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            widths: Vec::new(),
            activation: Activation::Identity,
            init_range: 0.001,
        }
    }

    #[must_use]
    pub fn layer(mut self, width: usize) -> Self {
        self.widths.push(width);
        self
    }

    #[must_use]
    pub fn layers(mut self, widths: &[usize]) -> Self {
        self.widths.extend_from_slice(widths);
        self
    }

    /// Nonlinearity inserted after every layer but the last.
    #[must_use]
    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Parameters start uniform in `[-range, range)`.
    #[must_use]
    pub fn init_range(mut self, range: f32) -> Self {
        self.init_range = range;
        self
    }

    pub fn build(self, rng: &mut fastrand::Rng) -> Result<FunctionApproximator> {
        if self.input_dim == 0 || self.widths.is_empty() || self.widths.contains(&0) {
            return Err(RlError::InvalidConfig(format!(
                "approximator needs a positive input width and non-empty positive layer widths, got {} -> {:?}",
                self.input_dim, self.widths
            )));
        }
        let range = self.init_range.abs();
        let mut prev = self.input_dim;
        let mut layers = Vec::with_capacity(self.widths.len());
        for &width in &self.widths {
            layers.push(Dense::uniform(prev, width, -range, range, rng));
            prev = width;
        }
        Ok(FunctionApproximator {
            input_dim: self.input_dim,
            activation: self.activation,
            layers,
        })
    }
}

/// Stacked affine layers mapping `[n, input_dim]` batches to `[n, output_dim]`.
/// The final layer is always linear.
#[derive(Clone, Debug)]
pub struct FunctionApproximator {
    input_dim: usize,
    activation: Activation,
    layers: Vec<Dense>,
}

impl FunctionApproximator {
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |l| l.out_dim)
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.w.len() + l.b.len()).sum()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Tensor> {
        self.layers.iter().flat_map(Dense::params)
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers.iter_mut().flat_map(Dense::params_mut).collect()
    }

    /// Forward pass. Pure: the same batch always yields the same output.
    pub fn evaluate(&self, batch: &Tensor) -> Result<Tensor> {
        self.check_input(batch)?;
        self.forward(batch, &mut Graph::new())
    }

    pub fn evaluate_rows<R: AsRef<[f32]>>(&self, rows: &[R]) -> Result<Tensor> {
        for row in rows {
            check_len("approximator input row", self.input_dim, row.as_ref().len())?;
        }
        let batch = Tensor::from_rows(rows, self.input_dim)?;
        self.evaluate(&batch)
    }

    /// Applies one optimizer step on `0.5 * sum((evaluate(inputs) - targets)^2)`
    /// and returns that loss as measured before the step.
    pub fn fit(&mut self, inputs: &Tensor, targets: &Tensor, optimizer: &mut dyn Optimizer) -> Result<f32> {
        self.check_input(inputs)?;
        check_len("target rows", inputs.rows(), targets.rows())?;
        check_len("target width", self.output_dim(), targets.cols())?;

        let mut tape = Tape::new();
        let out = self.forward(inputs, &mut tape)?;
        let loss = out
            .sub(targets, &mut tape)?
            .pow(2.0, &mut tape)
            .reduce_sum(&mut tape)
            .mul_scalar(0.5, &mut tape);
        let grads = tape.backward(&loss)?;
        optimizer.step(&mut self.parameters_mut(), &grads)?;
        Ok(loss.data[0])
    }

    fn check_input(&self, batch: &Tensor) -> Result<()> {
        if batch.shape.len() != 2 {
            return Err(RlError::ShapeMismatch {
                what: "approximator input rank",
                expected: 2,
                actual: batch.shape.len(),
            });
        }
        check_len("approximator input width", self.input_dim, batch.cols())
    }

    fn forward(&self, x: &Tensor, recorder: &mut impl Recorder) -> Result<Tensor> {
        let last = self.layers.len() - 1;
        let mut out = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            out = layer.forward(&out, recorder)?;
            if i < last {
                out = self.activation.apply(out, recorder);
            }
        }
        Ok(out)
    }
}
