use crate::cli::Args;
use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::resolution::IMGSZ_STEP;
use std::str::FromStr;

/// Which suppression strategy removes duplicate head circles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NmsMode {
    /// Center distance scaled by the smaller radius
    #[default]
    Distance,
    /// Circle intersection over union
    Area,
}

impl FromStr for NmsMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "area" | "iou" => Ok(Self::Area),
            _ => Err(ConfigError::UnknownVariant {
                kind: "nms mode",
                value: s.to_string(),
            }),
        }
    }
}

/// What the per-frame count measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    #[default]
    Heads,
    Persons,
}

impl FromStr for CountMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heads" | "head" => Ok(Self::Heads),
            "persons" | "person" | "people" => Ok(Self::Persons),
            _ => Err(ConfigError::UnknownVariant {
                kind: "count mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Body box to head circle geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadGeometry {
    pub min_head_radius: f32,
    pub max_head_radius: f32,
    /// Vertical offset of the head center below the box top, as a fraction of box height
    pub head_top_ratio: f32,
    /// Head radius as a fraction of the shorter box side
    pub head_radius_scale: f32,
}

impl Default for HeadGeometry {
    fn default() -> Self {
        Self {
            min_head_radius: 4.0,
            max_head_radius: 80.0,
            head_top_ratio: 0.17,
            head_radius_scale: 0.22,
        }
    }
}

/// Circular edge search run on the top of each body box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineParams {
    pub enabled: bool,
    /// Fraction of the box height searched for a head
    pub top_scale: f32,
    /// Inverse accumulator resolution
    pub dp: f32,
    /// Minimum distance between detected centers
    pub min_dist: f32,
    /// Upper Canny threshold; the lower one is half of it
    pub param1: f32,
    /// Accumulator votes needed for a center
    pub param2: f32,
    pub min_radius_scale: f32,
    pub max_radius_scale: f32,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            enabled: false,
            top_scale: 0.4,
            dp: 1.2,
            min_dist: 20.0,
            param1: 100.0,
            param2: 15.0,
            min_radius_scale: 0.15,
            max_radius_scale: 0.5,
        }
    }
}

/// Bounds and target for the adaptive resolution controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionParams {
    pub adaptive: bool,
    pub target_fps: f32,
    /// Resolution used for the first frame
    pub imgsz: u32,
    pub min_imgsz: u32,
    pub max_imgsz: u32,
}

impl ResolutionParams {
    /// `(min, initial, max)` input sizes, the shape range a dynamic-axis model is built for
    pub fn input_range(&self) -> (u32, u32, u32) {
        (self.min_imgsz, self.imgsz, self.max_imgsz)
    }
}

impl Default for ResolutionParams {
    fn default() -> Self {
        Self {
            adaptive: true,
            target_fps: 24.0,
            imgsz: 640,
            min_imgsz: 320,
            max_imgsz: 960,
        }
    }
}

/// Tunables of one stream analyzer, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub head: HeadGeometry,
    pub min_bbox_area: u32,
    pub nms_mode: NmsMode,
    pub circle_nms_factor: f32,
    pub nms_iou: f32,
    pub refine: RefineParams,
    pub resolution: ResolutionParams,
    pub count_mode: CountMode,
    pub alert_threshold: u32,
    pub history_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            head: HeadGeometry::default(),
            min_bbox_area: 400,
            nms_mode: NmsMode::Distance,
            circle_nms_factor: 0.8,
            nms_iou: 0.3,
            refine: RefineParams::default(),
            resolution: ResolutionParams::default(),
            count_mode: CountMode::Heads,
            alert_threshold: 9,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_head_radius(mut self, min: f32, max: f32) -> Self {
        self.head.min_head_radius = min;
        self.head.max_head_radius = max;
        self
    }

    pub fn with_head_top_ratio(mut self, ratio: f32) -> Self {
        self.head.head_top_ratio = ratio;
        self
    }

    pub fn with_head_radius_scale(mut self, scale: f32) -> Self {
        self.head.head_radius_scale = scale;
        self
    }

    pub fn with_min_bbox_area(mut self, area: u32) -> Self {
        self.min_bbox_area = area;
        self
    }

    pub fn with_nms_mode(mut self, mode: NmsMode) -> Self {
        self.nms_mode = mode;
        self
    }

    pub fn with_circle_nms_factor(mut self, factor: f32) -> Self {
        self.circle_nms_factor = factor;
        self
    }

    pub fn with_nms_iou(mut self, iou: f32) -> Self {
        self.nms_iou = iou;
        self
    }

    pub fn with_refine(mut self, refine: RefineParams) -> Self {
        self.refine = refine;
        self
    }

    pub fn with_refine_enabled(mut self, enabled: bool) -> Self {
        self.refine.enabled = enabled;
        self
    }

    pub fn with_resolution(mut self, resolution: ResolutionParams) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.resolution.adaptive = adaptive;
        self
    }

    pub fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: u32) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Rejects values the pipeline cannot honor mid-stream
    pub fn validate(&self) -> Result<(), ConfigError> {
        let head = &self.head;
        positive("min_head_radius", head.min_head_radius)?;
        positive("max_head_radius", head.max_head_radius)?;
        if head.min_head_radius > head.max_head_radius {
            return Err(ConfigError::HeadRadiusRange {
                min: head.min_head_radius,
                max: head.max_head_radius,
            });
        }
        if !(head.head_top_ratio > 0.0 && head.head_top_ratio < 1.0) {
            return Err(ConfigError::out_of_range("head_top_ratio", head.head_top_ratio, "0 < ratio < 1"));
        }
        positive("head_radius_scale", head.head_radius_scale)?;

        positive("circle_nms_factor", self.circle_nms_factor)?;
        if !(0.0..=1.0).contains(&self.nms_iou) {
            return Err(ConfigError::out_of_range("nms_iou", self.nms_iou, "0..=1"));
        }

        let refine = &self.refine;
        if !(refine.top_scale > 0.0 && refine.top_scale <= 1.0) {
            return Err(ConfigError::out_of_range("refine_top_scale", refine.top_scale, "0 < scale <= 1"));
        }
        if !(refine.dp >= 1.0 && refine.dp.is_finite()) {
            return Err(ConfigError::out_of_range("dp", refine.dp, ">= 1"));
        }
        positive("min_dist", refine.min_dist)?;
        positive("param1", refine.param1)?;
        positive("param2", refine.param2)?;
        if !(refine.min_radius_scale >= 0.0 && refine.min_radius_scale.is_finite()) {
            return Err(ConfigError::out_of_range("min_radius_scale", refine.min_radius_scale, ">= 0"));
        }
        if !(refine.max_radius_scale >= refine.min_radius_scale && refine.max_radius_scale.is_finite()) {
            return Err(ConfigError::out_of_range(
                "max_radius_scale",
                refine.max_radius_scale,
                ">= min_radius_scale",
            ));
        }

        let res = &self.resolution;
        positive("target_fps", res.target_fps)?;
        if res.min_imgsz > res.max_imgsz {
            return Err(ConfigError::ImgszRange {
                min: res.min_imgsz,
                max: res.max_imgsz,
            });
        }
        if res.min_imgsz < IMGSZ_STEP {
            return Err(ConfigError::out_of_range("min_imgsz", res.min_imgsz, ">= 64"));
        }
        if res.imgsz < res.min_imgsz || res.imgsz > res.max_imgsz {
            return Err(ConfigError::ImgszOutOfBounds {
                imgsz: res.imgsz,
                min: res.min_imgsz,
                max: res.max_imgsz,
            });
        }
        if (res.imgsz - res.min_imgsz) % IMGSZ_STEP != 0 || (res.max_imgsz - res.imgsz) % IMGSZ_STEP != 0 {
            return Err(ConfigError::ImgszStep {
                imgsz: res.imgsz,
                min: res.min_imgsz,
                max: res.max_imgsz,
                step: IMGSZ_STEP,
            });
        }

        if self.alert_threshold == 0 {
            return Err(ConfigError::out_of_range("alert_threshold", self.alert_threshold, ">= 1"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::out_of_range("history_capacity", 0u32, ">= 1"));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(name, value, "> 0"))
    }
}

/// Builds a validated analyzer configuration from command line arguments
pub fn build_config(args: &Args) -> Result<AnalyzerConfig, ConfigError> {
    let refine = RefineParams {
        enabled: args.enable_refine,
        top_scale: args.refine_top_scale,
        dp: args.refine_dp,
        min_dist: args.refine_min_dist,
        param1: args.refine_param1,
        param2: args.refine_param2,
        min_radius_scale: args.refine_min_radius_scale,
        max_radius_scale: args.refine_max_radius_scale,
    };
    let resolution = ResolutionParams {
        adaptive: !args.no_adaptive,
        target_fps: args.target_fps,
        imgsz: args.imgsz,
        min_imgsz: args.min_imgsz,
        max_imgsz: args.max_imgsz,
    };

    let config = AnalyzerConfig::default()
        .with_head_radius(args.min_head_radius, args.max_head_radius)
        .with_head_top_ratio(args.head_top_ratio)
        .with_head_radius_scale(args.head_radius_scale)
        .with_min_bbox_area(args.min_bbox_area)
        .with_nms_mode(args.nms_mode.parse()?)
        .with_circle_nms_factor(args.circle_nms_factor)
        .with_nms_iou(args.nms_iou)
        .with_refine(refine)
        .with_resolution(resolution)
        .with_count_mode(args.count_mode.parse()?)
        .with_alert_threshold(args.alert_threshold);

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalyzerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_head_radius_is_rejected() {
        let config = AnalyzerConfig::default().with_head_radius(30.0, 10.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::HeadRadiusRange { min: 30.0, max: 10.0 })
        );
    }

    #[test]
    fn test_inverted_imgsz_bounds_are_rejected() {
        let config = AnalyzerConfig::default().with_resolution(ResolutionParams {
            min_imgsz: 960,
            max_imgsz: 320,
            imgsz: 640,
            ..ResolutionParams::default()
        });
        assert_eq!(config.validate(), Err(ConfigError::ImgszRange { min: 960, max: 320 }));
    }

    #[test]
    fn test_imgsz_must_sit_on_step_grid() {
        let config = AnalyzerConfig::default().with_resolution(ResolutionParams {
            imgsz: 600,
            ..ResolutionParams::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::ImgszStep { .. })));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let bad_iou = AnalyzerConfig::default().with_nms_iou(1.2);
        assert!(matches!(bad_iou.validate(), Err(ConfigError::OutOfRange { name: "nms_iou", .. })));

        let bad_factor = AnalyzerConfig::default().with_circle_nms_factor(0.0);
        assert!(bad_factor.validate().is_err());

        let bad_alert = AnalyzerConfig::default().with_alert_threshold(0);
        assert!(bad_alert.validate().is_err());

        let bad_ratio = AnalyzerConfig::default().with_head_top_ratio(f32::NAN);
        assert!(bad_ratio.validate().is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("distance".parse::<NmsMode>(), Ok(NmsMode::Distance));
        assert_eq!("AREA".parse::<NmsMode>(), Ok(NmsMode::Area));
        assert!("boxes".parse::<NmsMode>().is_err());
        assert_eq!("persons".parse::<CountMode>(), Ok(CountMode::Persons));
        assert_eq!("heads".parse::<CountMode>(), Ok(CountMode::Heads));
    }

    #[test]
    fn test_build_config_from_args() {
        let args = Args::from_args(
            &["headcount"],
            &[
                "--nms-mode",
                "area",
                "--nms-iou",
                "0.25",
                "--count-mode",
                "persons",
                "--alert-threshold",
                "12",
                "--enable-refine",
                "--no-adaptive",
            ],
        )
        .unwrap();
        let config = build_config(&args).unwrap();
        assert_eq!(config.nms_mode, NmsMode::Area);
        assert_eq!(config.nms_iou, 0.25);
        assert_eq!(config.count_mode, CountMode::Persons);
        assert_eq!(config.alert_threshold, 12);
        assert!(config.refine.enabled);
        assert!(!config.resolution.adaptive);
        assert_eq!(config.resolution.imgsz, 640);
        assert_eq!(config.refine, RefineParams { enabled: true, ..RefineParams::default() });
    }

    #[test]
    fn test_refine_flags_reach_circle_search() {
        let args = Args::from_args(
            &["headcount"],
            &[
                "--refine-dp",
                "1.5",
                "--refine-min-dist",
                "12",
                "--refine-param1",
                "80",
                "--refine-param2",
                "10",
                "--refine-min-radius-scale",
                "0.2",
                "--refine-max-radius-scale",
                "0.45",
            ],
        )
        .unwrap();
        let refine = build_config(&args).unwrap().refine;
        assert_eq!(refine.dp, 1.5);
        assert_eq!(refine.min_dist, 12.0);
        assert_eq!(refine.param1, 80.0);
        assert_eq!(refine.param2, 10.0);
        assert_eq!(refine.min_radius_scale, 0.2);
        assert_eq!(refine.max_radius_scale, 0.45);

        let inverted = Args::from_args(
            &["headcount"],
            &["--refine-min-radius-scale", "0.6", "--refine-max-radius-scale", "0.3"],
        )
        .unwrap();
        assert!(build_config(&inverted).is_err());
    }

    #[test]
    fn test_input_range_follows_resolution_args() {
        let args = Args::from_args(
            &["headcount"],
            &["--imgsz", "512", "--min-imgsz", "256", "--max-imgsz", "768"],
        )
        .unwrap();
        let config = build_config(&args).unwrap();
        assert_eq!(config.resolution.input_range(), (256, 512, 768));
        assert_eq!(ResolutionParams::default().input_range(), (320, 640, 960));
    }

    #[test]
    fn test_build_config_rejects_unknown_mode() {
        let args = Args::from_args(&["headcount"], &["--nms-mode", "boxes"]).unwrap();
        assert!(matches!(build_config(&args), Err(ConfigError::UnknownVariant { .. })));
    }
}
