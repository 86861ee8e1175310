use serde::Deserialize;
use std::{path::PathBuf, str::FromStr};

use crate::suppressor::NmsConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub log_level: LogLevel,
    pub assets: AssetsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub demo: DemoConfig,
}

pub trait Validatable {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    pub model_url: String,
    pub labels_url: String,
    pub cache_dir: PathBuf,
    #[serde(default = "default_model_key")]
    pub model_key: String,
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_model_key() -> String {
    "animal_detector".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Validatable for AssetsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.model_key.trim().is_empty() {
            return Err("assets.model_key must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    #[serde(default = "default_input_size")]
    pub input_width: u32,
    #[serde(default = "default_input_size")]
    pub input_height: u32,
    #[serde(default = "default_max_outputs")]
    pub max_outputs: usize,
    #[serde(default = "default_threshold")]
    pub iou_threshold: f32,
    #[serde(default = "default_threshold")]
    pub score_threshold: f32,
    #[serde(default)]
    pub scores_output: usize,
    #[serde(default = "default_boxes_output")]
    pub boxes_output: usize,
}

fn default_input_size() -> u32 {
    416
}

fn default_max_outputs() -> usize {
    20
}

fn default_threshold() -> f32 {
    0.5
}

fn default_boxes_output() -> usize {
    1
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            input_width: default_input_size(),
            input_height: default_input_size(),
            max_outputs: default_max_outputs(),
            iou_threshold: default_threshold(),
            score_threshold: default_threshold(),
            scores_output: 0,
            boxes_output: default_boxes_output(),
        }
    }
}

impl DetectionConfig {
    pub fn get_nms_config(&self) -> NmsConfig {
        NmsConfig {
            max_outputs: self.max_outputs,
            iou_threshold: self.iou_threshold,
            score_threshold: self.score_threshold,
        }
    }
}

impl Validatable for DetectionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(format!(
                "Invalid model input size {}x{}",
                self.input_width, self.input_height
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "detection.iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(format!(
                "detection.score_threshold must be within [0, 1], got {}",
                self.score_threshold
            ));
        }
        if self.scores_output == self.boxes_output {
            return Err(format!(
                "detection.scores_output and detection.boxes_output both point at output {}",
                self.scores_output
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_box_color")]
    pub box_color: [u8; 3],
    #[serde(default)]
    pub text_color: [u8; 3],
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_box_color() -> [u8; 3] {
    [0, 255, 255]
}

fn default_line_width() -> u32 {
    4
}

fn default_font_size() -> f32 {
    16.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            box_color: default_box_color(),
            text_color: [0, 0, 0],
            line_width: default_line_width(),
            font_size: default_font_size(),
            font_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DemoConfig {
    pub input_image: PathBuf,
    pub output_image: PathBuf,
    #[serde(default)]
    pub display_width: Option<u32>,
    #[serde(default)]
    pub display_height: Option<u32>,
}

impl Validatable for DemoConfig {
    fn validate(&self) -> Result<(), String> {
        match (self.display_width, self.display_height) {
            (None, None) => Ok(()),
            (Some(0), _) | (_, Some(0)) => {
                Err("demo display size must be non-zero".to_string())
            }
            (Some(_), Some(_)) => Ok(()),
            (width, height) => Err(format!(
                "demo.display_width and demo.display_height must be set together, got {:?} x {:?}",
                width, height
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Result<Self, String> {
        std::env::var("APP_ENVIRONMENT")
            .map(|value| value.parse())
            .unwrap_or(Ok(Environment::Local))
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "Unknown APP_ENVIRONMENT {:?}, expected local or production",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ]
        .into_iter()
        .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("Unknown log_level {:?}", s))
    }
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No working directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment = Environment::from_env().map_err(config::ConfigError::Message)?;

    let config = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(format!("{}.yaml", environment.as_str())),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = config.try_deserialize::<Config>()?;
    for result in [
        config.assets.validate(),
        config.detection.validate(),
        config.demo.validate(),
    ] {
        if let Err(e) = result {
            tracing::error!("Configuration validation failed: {}", e);
            return Err(config::ConfigError::Message(e));
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults() {
        let detection = DetectionConfig::default();
        let nms = detection.get_nms_config();

        assert_eq!(detection.input_width, 416);
        assert_eq!(detection.input_height, 416);
        assert_eq!(nms.max_outputs, 20);
        assert_eq!(nms.iou_threshold, 0.5);
        assert_eq!(nms.score_threshold, 0.5);
        assert!(detection.validate().is_ok());
    }

    #[test]
    fn test_detection_validation_rejects_bad_values() {
        let detection = DetectionConfig {
            iou_threshold: 1.5,
            ..DetectionConfig::default()
        };
        assert!(detection.validate().is_err());

        let detection = DetectionConfig {
            input_width: 0,
            ..DetectionConfig::default()
        };
        assert!(detection.validate().is_err());

        let detection = DetectionConfig {
            boxes_output: 0,
            ..DetectionConfig::default()
        };
        assert!(detection.validate().is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        let level: LogLevel = "DEBUG".to_string().try_into().unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(LogLevel::try_from(" warn".to_string()), Ok(LogLevel::Warn));
        assert!(LogLevel::try_from("verbose".to_string()).is_err());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("Production".parse(), Ok(Environment::Production));
        assert_eq!("local".parse(), Ok(Environment::Local));
        assert!("staging".parse::<Environment>().is_err());
    }

    fn demo(display_width: Option<u32>, display_height: Option<u32>) -> DemoConfig {
        DemoConfig {
            input_image: "image.jpg".into(),
            output_image: "out.png".into(),
            display_width,
            display_height,
        }
    }

    #[test]
    fn test_demo_display_size_must_be_complete() {
        assert!(demo(None, None).validate().is_ok());
        assert!(demo(Some(640), Some(480)).validate().is_ok());
        assert!(demo(Some(640), None).validate().is_err());
        assert!(demo(None, Some(480)).validate().is_err());
        assert!(demo(Some(0), Some(480)).validate().is_err());
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
log_level: info
assets:
  model_url: models/model.onnx
  labels_url: models/labels.json
  cache_dir: .cache
detection:
  score_threshold: 0.3
demo:
  input_image: image.jpg
  output_image: out.png
"#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.assets.model_key, "animal_detector");
        assert_eq!(config.detection.score_threshold, 0.3);
        assert_eq!(config.detection.max_outputs, 20);
        assert_eq!(config.render.box_color, [0, 255, 255]);
        assert_eq!(config.render.line_width, 4);
    }
}
