use argh::FromArgs;

/// Crowd head counter: person boxes to deduplicated heads, smoothed counts and density alerts
#[derive(FromArgs, Debug)]
pub struct Args {
    /// source: video file, image folder or stream url
    #[argh(option, default = "String::from(\"./video/crowd.mp4\")")]
    pub source: String,

    /// camera id attached to every report
    #[argh(option, default = "String::from(\"cam01\")")]
    pub camera_id: String,

    /// path to the YOLO onnx model
    #[argh(option)]
    pub model: Option<String>,

    /// model dtype
    #[argh(option, default = "String::from(\"auto\")")]
    pub dtype: String,

    /// version
    #[argh(option, default = "8.0")]
    pub ver: f32,

    /// device: cuda, cpu, mps
    #[argh(option, default = "String::from(\"cpu:0\")")]
    pub device: String,

    /// scale: n, s, m, l
    #[argh(option, default = "String::from(\"n\")")]
    pub scale: String,

    /// person confidence threshold
    #[argh(option, default = "0.35")]
    pub confidence: f32,

    /// stop after this many analyzed frames
    #[argh(option)]
    pub max_frames: Option<u64>,

    /// analyze every nth frame read from the source
    #[argh(option, default = "1")]
    pub sample_rate: u64,

    /// minimum body box area in pixels
    #[argh(option, default = "400")]
    pub min_bbox_area: u32,

    /// minimum head radius in pixels
    #[argh(option, default = "4.0")]
    pub min_head_radius: f32,

    /// maximum head radius in pixels
    #[argh(option, default = "80.0")]
    pub max_head_radius: f32,

    /// head center offset below the box top as a fraction of box height
    #[argh(option, default = "0.17")]
    pub head_top_ratio: f32,

    /// head radius as a fraction of the shorter box side
    #[argh(option, default = "0.22")]
    pub head_radius_scale: f32,

    /// duplicate suppression: distance or area
    #[argh(option, default = "String::from(\"distance\")")]
    pub nms_mode: String,

    /// distance mode suppression factor
    #[argh(option, default = "0.8")]
    pub circle_nms_factor: f32,

    /// area mode IoU threshold
    #[argh(option, default = "0.3")]
    pub nms_iou: f32,

    /// refine head circles with a circular edge search
    #[argh(switch)]
    pub enable_refine: bool,

    /// fraction of the box height searched during refinement
    #[argh(option, default = "0.4")]
    pub refine_top_scale: f32,

    /// inverse accumulator resolution of the circle search
    #[argh(option, default = "1.2")]
    pub refine_dp: f32,

    /// minimum distance between circle centers
    #[argh(option, default = "20.0")]
    pub refine_min_dist: f32,

    /// upper edge threshold of the circle search
    #[argh(option, default = "100.0")]
    pub refine_param1: f32,

    /// accumulator votes a circle center needs
    #[argh(option, default = "15.0")]
    pub refine_param2: f32,

    /// smallest circle radius as a fraction of the search region
    #[argh(option, default = "0.15")]
    pub refine_min_radius_scale: f32,

    /// largest circle radius as a fraction of the search region
    #[argh(option, default = "0.5")]
    pub refine_max_radius_scale: f32,

    /// keep the inference resolution fixed
    #[argh(switch)]
    pub no_adaptive: bool,

    /// frame rate the resolution controller aims for
    #[argh(option, default = "24.0")]
    pub target_fps: f32,

    /// initial inference resolution
    #[argh(option, default = "640")]
    pub imgsz: u32,

    /// smallest inference resolution
    #[argh(option, default = "320")]
    pub min_imgsz: u32,

    /// largest inference resolution
    #[argh(option, default = "960")]
    pub max_imgsz: u32,

    /// what to count: heads or persons
    #[argh(option, default = "String::from(\"heads\")")]
    pub count_mode: String,

    /// instantaneous count that raises the density alert
    #[argh(option, default = "9")]
    pub alert_threshold: u32,
}
