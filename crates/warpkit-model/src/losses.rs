//! Image similarity and label overlap losses.
//!
//! Every loss reduces to one value per batch element, shape `[B]`, and is
//! minimised by a perfect prediction.

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::conv::{Conv3d, Conv3dConfig};
use burn::nn::PaddingConfig3d;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use warpkit_core::{ensure_dims, Result, WarpError};

/// Numerical floor shared by all losses.
pub const EPS: f64 = 1e-5;

/// Flatten `[B, ...]` to `[B, N]` after checking both operands agree.
fn flatten_pair<B: Backend, const D: usize>(
    y_true: Tensor<B, D>,
    y_pred: Tensor<B, D>,
) -> Result<(Tensor<B, 2>, Tensor<B, 2>)> {
    let dims = y_true.dims();
    ensure_dims("y_pred", &y_pred.dims(), &dims)?;
    let batch = dims[0];
    let rest: usize = dims[1..].iter().product();
    Ok((y_true.reshape([batch, rest]), y_pred.reshape([batch, rest])))
}

fn per_batch<B: Backend>(values: Tensor<B, 2>) -> Tensor<B, 1> {
    let [batch, _] = values.dims();
    values.reshape([batch])
}

/// Sum of squared differences, averaged over voxels.
pub fn ssd<B: Backend, const D: usize>(y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
    let (y_true, y_pred) = flatten_pair(y_true, y_pred)?;
    Ok(per_batch((y_true - y_pred).powf_scalar(2.0).mean_dim(1)))
}

/// Negative global normalized cross correlation.
///
/// `-(mean(t̂·p̂) + EPS) / (std(t)·std(p) + EPS)` with `t̂ = t - mean(t)`.
pub fn global_ncc<B: Backend, const D: usize>(y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
    let (y_true, y_pred) = flatten_pair(y_true, y_pred)?;
    let t_hat = y_true.clone() - y_true.mean_dim(1);
    let p_hat = y_pred.clone() - y_pred.mean_dim(1);

    let cross = (t_hat.clone() * p_hat.clone()).mean_dim(1);
    let t_std = t_hat.powf_scalar(2.0).mean_dim(1).sqrt();
    let p_std = p_hat.powf_scalar(2.0).mean_dim(1).sqrt();

    let ncc = cross.add_scalar(EPS) / (t_std * p_std).add_scalar(EPS);
    Ok(per_batch(ncc.neg()))
}

/// Soft Dice loss `1 - (2Σtp + EPS) / (Σt + Σp + EPS)`.
///
/// Two empty labels score a perfect overlap.
pub fn dice_loss<B: Backend, const D: usize>(y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
    let (y_true, y_pred) = flatten_pair(y_true, y_pred)?;
    let intersection = (y_true.clone() * y_pred.clone()).sum_dim(1);
    let total = y_true.sum_dim(1) + y_pred.sum_dim(1);

    let dice = intersection.mul_scalar(2.0).add_scalar(EPS) / total.add_scalar(EPS);
    Ok(per_batch(dice.neg().add_scalar(1.0)))
}

/// Soft Jaccard loss `1 - (Σtp + EPS) / (Σt + Σp - Σtp + EPS)`.
pub fn jaccard_loss<B: Backend, const D: usize>(y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
    let (y_true, y_pred) = flatten_pair(y_true, y_pred)?;
    let intersection = (y_true.clone() * y_pred.clone()).sum_dim(1);
    let union = y_true.sum_dim(1) + y_pred.sum_dim(1) - intersection.clone();

    let jaccard = intersection.add_scalar(EPS) / union.add_scalar(EPS);
    Ok(per_batch(jaccard.neg().add_scalar(1.0)))
}

/// Binary cross entropy of probabilities `y_pred` against soft labels `y_true`.
///
/// Predictions are clipped to `[EPS, 1 - EPS]`.
pub fn cross_entropy<B: Backend, const D: usize>(y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
    let (y_true, y_pred) = flatten_pair(y_true, y_pred)?;
    let y_pred = y_pred.clamp(EPS, 1.0 - EPS);

    let positive = y_true.clone() * y_pred.clone().log();
    let negative = y_true.neg().add_scalar(1.0) * y_pred.neg().add_scalar(1.0).log();
    Ok(per_batch((positive + negative).mean_dim(1).neg()))
}

/// Configuration for [`LocalNccLoss`].
#[derive(Config, Debug, PartialEq)]
pub struct LocalNccConfig {
    /// Edge length of the cubic window, odd.
    #[config(default = "9")]
    pub kernel_size: usize,
}

impl LocalNccConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<LocalNccLoss<B>> {
        LocalNccLoss::new(self.kernel_size, device)
    }
}

/// Local Normalized Cross Correlation (NCC) Loss.
///
/// Computes the NCC between two images over a sliding cubic window.
/// A perfect match is 1.0, uncorrelated is 0.0.
/// The loss returned is -NCC (so minimizing it maximizes correlation).
#[derive(Module, Debug)]
pub struct LocalNccLoss<B: Backend> {
    window_conv: Conv3d<B>,
    kernel_size: usize,
}

impl<B: Backend> LocalNccLoss<B> {
    /// Create a new Local NCC loss module.
    ///
    /// # Arguments
    /// * `kernel_size` - Size of the sliding window (cube), odd.
    /// * `device` - Device to create the module on.
    pub fn new(kernel_size: usize, device: &B::Device) -> Result<Self> {
        if kernel_size == 0 || kernel_size % 2 == 0 {
            return Err(WarpError::invalid_configuration(format!(
                "local NCC kernel size must be odd, got {kernel_size}"
            )));
        }
        let padding = kernel_size / 2;
        let mut window_conv = Conv3dConfig::new([1, 1], [kernel_size; 3])
            .with_stride([1, 1, 1])
            .with_padding(PaddingConfig3d::Explicit(padding, padding, padding))
            .with_bias(false)
            .init(device);

        // Box filter computing the local mean directly.
        let n = (kernel_size * kernel_size * kernel_size) as f32;
        let weight = Tensor::ones([1, 1, kernel_size, kernel_size, kernel_size], device) / n;
        window_conv.weight = Param::from_tensor(weight);
        // The box filter is a constant; optimizers must not update it.
        let window_conv = window_conv.no_grad();

        Ok(Self {
            window_conv,
            kernel_size,
        })
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Loss for `y_true` (fixed) and `y_pred` (warped moving), both `[B, D1, D2, D3]`.
    pub fn forward(&self, y_true: Tensor<B, 4>, y_pred: Tensor<B, 4>) -> Result<Tensor<B, 1>> {
        let dims = y_true.dims();
        ensure_dims("y_pred", &y_pred.dims(), &dims)?;
        let [batch, d1, d2, d3] = dims;

        let t: Tensor<B, 5> = y_true.reshape([batch, 1, d1, d2, d3]);
        let p: Tensor<B, 5> = y_pred.reshape([batch, 1, d1, d2, d3]);

        let t_mean = self.window_conv.forward(t.clone());
        let p_mean = self.window_conv.forward(p.clone());
        let t2_mean = self.window_conv.forward(t.clone() * t.clone());
        let p2_mean = self.window_conv.forward(p.clone() * p.clone());
        let tp_mean = self.window_conv.forward(t * p);

        let cross = tp_mean - t_mean.clone() * p_mean.clone();
        let t_var = t2_mean - t_mean.powf_scalar(2.0);
        let p_var = p2_mean - p_mean.powf_scalar(2.0);

        let ncc = (cross.clone() * cross).add_scalar(EPS) / (t_var * p_var).add_scalar(EPS);
        let ncc = ncc.reshape([batch, d1 * d2 * d3]).mean_dim(1);
        Ok(per_batch(ncc.neg()))
    }
}
