//! `BlazeFace` short-range face detection network.
//!
//! Front-camera `BlazeFace` (128x128 input, 896 anchors) with `BatchNorm`
//! folded into the convolution biases, matching the hollance/BlazeFace-PyTorch
//! weight layout.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};
use image::RgbImage;

/// Network input edge length.
pub const INPUT_SIZE: usize = 128;

const NUM_ANCHORS: usize = 896;

/// Regressor values per anchor: box (4) plus six keypoints (12).
const REGRESSOR_WIDTH: usize = 16;

/// A raw network detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFace {
    /// `[x_min, y_min, x_max, y_max]` normalized to `[0, 1]`.
    pub bbox: [f32; 4],
    pub score: f32,
}

impl RawFace {
    fn area(&self) -> f32 {
        (self.bbox[2] - self.bbox[0]).max(0.0) * (self.bbox[3] - self.bbox[1]).max(0.0)
    }

    /// Intersection over union with another detection.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let (a, b) = (&self.bbox, &other.bbox);
        let w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
        let h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
        let intersection = w * h;
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Depthwise-separable residual block.
struct BlazeBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
    channel_pad: usize,
    stride: usize,
}

impl BlazeBlock {
    fn new(
        in_channels: usize,
        out_channels: usize,
        stride: usize,
        vb: &VarBuilder,
    ) -> Result<Self> {
        const KERNEL: usize = 3;
        // Stride-2 blocks pad explicitly in `forward`.
        let padding = if stride == 2 { 0 } else { (KERNEL - 1) / 2 };

        let depthwise = conv2d(
            in_channels,
            in_channels,
            KERNEL,
            Conv2dConfig {
                stride,
                padding,
                groups: in_channels,
                ..Conv2dConfig::default()
            },
            vb.pp("depthwise"),
        )?;
        let pointwise = conv2d(
            in_channels,
            out_channels,
            1,
            Conv2dConfig::default(),
            vb.pp("pointwise"),
        )?;

        Ok(Self {
            depthwise,
            pointwise,
            channel_pad: out_channels.saturating_sub(in_channels),
            stride,
        })
    }
}

impl Module for BlazeBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (input, shortcut) = if self.stride == 2 {
            (
                x.pad_with_zeros(2, 0, 2)?.pad_with_zeros(3, 0, 2)?,
                x.max_pool2d(2)?,
            )
        } else {
            (x.clone(), x.clone())
        };

        let h = self.pointwise.forward(&self.depthwise.forward(&input)?)?;
        let shortcut = if self.channel_pad > 0 {
            shortcut.pad_with_zeros(1, 0, self.channel_pad)?
        } else {
            shortcut
        };

        (h + shortcut)?.relu()
    }
}

/// (in, out, stride) for the blocks producing the 16x16 feature map.
const BACKBONE1: [(usize, usize, usize); 11] = [
    (24, 24, 1),
    (24, 28, 1),
    (28, 32, 2),
    (32, 36, 1),
    (36, 42, 1),
    (42, 48, 2),
    (48, 56, 1),
    (56, 64, 1),
    (64, 72, 1),
    (72, 80, 1),
    (80, 88, 1),
];

/// (in, out, stride) for the blocks producing the 8x8 feature map.
const BACKBONE2: [(usize, usize, usize); 5] = [
    (88, 96, 2),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
];

/// The `BlazeFace` network.
pub struct BlazeFace {
    conv0: Conv2d,
    backbone1: Vec<BlazeBlock>,
    backbone2: Vec<BlazeBlock>,
    /// Heads on the 16x16 map, 2 anchors per cell.
    classifier_16: Conv2d,
    regressor_16: Conv2d,
    /// Heads on the 8x8 map, 6 anchors per cell.
    classifier_8: Conv2d,
    regressor_8: Conv2d,
    /// Anchor centres, `NUM_ANCHORS` pairs of `[cx, cy]`.
    anchors: Vec<[f32; 2]>,
    device: Device,
}

impl BlazeFace {
    /// Builds the network from a weight store.
    ///
    /// # Errors
    ///
    /// Returns an error if a weight is missing or has the wrong shape.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let conv0 = conv2d(
            3,
            24,
            5,
            Conv2dConfig {
                stride: 2,
                ..Conv2dConfig::default()
            },
            vb.pp("conv0"),
        )?;

        let backbone1 = BACKBONE1
            .iter()
            .enumerate()
            .map(|(i, &(cin, cout, s))| {
                BlazeBlock::new(cin, cout, s, &vb.pp(format!("backbone1.{i}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let backbone2 = BACKBONE2
            .iter()
            .enumerate()
            .map(|(i, &(cin, cout, s))| {
                BlazeBlock::new(cin, cout, s, &vb.pp(format!("backbone2.{i}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let head =
            |cin, cout, name: &str| conv2d(cin, cout, 1, Conv2dConfig::default(), vb.pp(name));

        Ok(Self {
            conv0,
            backbone1,
            backbone2,
            classifier_16: head(88, 2, "classifier_16")?,
            regressor_16: head(88, 2 * REGRESSOR_WIDTH, "regressor_16")?,
            classifier_8: head(96, 6, "classifier_8")?,
            regressor_8: head(96, 6 * REGRESSOR_WIDTH, "regressor_8")?,
            anchors: anchors(),
            device: vb.device().clone(),
        })
    }

    /// Resizes and normalizes an image into a `(1, 3, 128, 128)` tensor in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if tensor creation fails.
    pub fn preprocess(&self, image: &RgbImage) -> Result<Tensor> {
        let resized = image::imageops::resize(
            image,
            INPUT_SIZE as u32,
            INPUT_SIZE as u32,
            image::imageops::FilterType::Lanczos3,
        );

        let data: Vec<f32> = resized
            .as_raw()
            .iter()
            .map(|&v| f32::from(v) / 127.5 - 1.0)
            .collect();

        Tensor::from_vec(data, (1, INPUT_SIZE, INPUT_SIZE, 3), &self.device)?
            .permute((0, 3, 1, 2))?
            .to_dtype(DType::F32)
            .context("Failed to build BlazeFace input tensor")
    }

    /// Returns raw classifier logits `(1, 896, 1)` and regressors `(1, 896, 16)`.
    fn forward(&self, x: &Tensor) -> Result<(Tensor, Tensor)> {
        let x = x.pad_with_zeros(2, 1, 2)?.pad_with_zeros(3, 1, 2)?;
        let mut h = self.conv0.forward(&x)?.relu()?;

        for block in &self.backbone1 {
            h = block.forward(&h)?;
        }
        let map_16 = h.clone();
        for block in &self.backbone2 {
            h = block.forward(&h)?;
        }
        let map_8 = h;

        let flatten = |t: Tensor, anchors: usize, width: usize| {
            t.permute((0, 2, 3, 1))?.reshape((1, anchors, width))
        };
        let scores = Tensor::cat(
            &[
                flatten(self.classifier_16.forward(&map_16)?, 512, 1)?,
                flatten(self.classifier_8.forward(&map_8)?, 384, 1)?,
            ],
            1,
        )?;
        let boxes = Tensor::cat(
            &[
                flatten(self.regressor_16.forward(&map_16)?, 512, REGRESSOR_WIDTH)?,
                flatten(self.regressor_8.forward(&map_8)?, 384, REGRESSOR_WIDTH)?,
            ],
            1,
        )?;

        Ok((scores, boxes))
    }

    /// Detects faces, keeping those scoring at least `min_score` and
    /// suppressing overlaps above `nms_threshold`.
    ///
    /// Results are in descending score order.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(
        &self,
        image: &RgbImage,
        min_score: f32,
        nms_threshold: f32,
    ) -> Result<Vec<RawFace>> {
        let input = self.preprocess(image)?;
        let (scores, boxes) = self.forward(&input)?;

        let scores = scores.squeeze(0)?.to_vec2::<f32>()?;
        let boxes = boxes.squeeze(0)?.to_vec2::<f32>()?;
        let size = INPUT_SIZE as f32;

        let candidates = self
            .anchors
            .iter()
            .zip(scores.iter().zip(&boxes))
            .filter_map(|(&[ax, ay], (logit, reg))| {
                let score = sigmoid(logit[0]);
                if score < min_score {
                    return None;
                }
                let cx = ax + reg[0] / size;
                let cy = ay + reg[1] / size;
                let (hw, hh) = (reg[2] / size / 2.0, reg[3] / size / 2.0);
                Some(RawFace {
                    bbox: [
                        (cx - hw).clamp(0.0, 1.0),
                        (cy - hh).clamp(0.0, 1.0),
                        (cx + hw).clamp(0.0, 1.0),
                        (cy + hh).clamp(0.0, 1.0),
                    ],
                    score,
                })
            })
            .collect();

        Ok(non_max_suppression(candidates, nms_threshold))
    }
}

/// Anchor centres for the 16x16 (2 per cell) and 8x8 (6 per cell) maps.
fn anchors() -> Vec<[f32; 2]> {
    let mut out = Vec::with_capacity(NUM_ANCHORS);
    for (grid, per_cell) in [(16_u8, 2), (8_u8, 6)] {
        let g = f32::from(grid);
        for y in 0..grid {
            for x in 0..grid {
                let centre = [(f32::from(x) + 0.5) / g, (f32::from(y) + 0.5) / g];
                out.extend(std::iter::repeat(centre).take(per_cell));
            }
        }
    }
    out
}

/// Greedy suppression: keep the best box, drop everything overlapping it, repeat.
///
/// Ties in score keep anchor order, so the output is deterministic.
#[must_use]
pub fn non_max_suppression(mut faces: Vec<RawFace>, threshold: f32) -> Vec<RawFace> {
    faces.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<RawFace> = Vec::with_capacity(faces.len());
    for face in faces {
        if kept.iter().all(|k| k.iou(&face) < threshold) {
            kept.push(face);
        }
    }
    kept
}
