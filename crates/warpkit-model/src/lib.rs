pub mod augmentation;
pub mod head;
pub mod losses;

pub use augmentation::{AffineAugmentation, AffineAugmentationConfig, AugmentedPair};
pub use head::{AffineHead, ConditionalHead, DdfHead, DvfHead, HeadOutput};
pub use losses::{
    cross_entropy, dice_loss, global_ncc, jaccard_loss, ssd, LocalNccConfig, LocalNccLoss,
};
