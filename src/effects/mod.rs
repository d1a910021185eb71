/// Beat-locked zoom/sway synthesis and the closing fade.
pub mod motion;
