//! Text plots: requests decoded from `plot`, the per-project queue and its rendering.

mod canvas;

use crate::error::ShellError;

pub use canvas::{render_boxplot, render_histogram, render_scatter, HIST_BINS};

/// A decoded `plot` sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotRequest {
    Hist(Vec<String>),
    Box(Vec<String>),
    Scatter { x: String, y: String },
    Show,
    Close,
}

impl PlotRequest {
    /// Combine the sub-command with its labels; every drawing command needs at least one.
    pub fn from_parts(cmd: &str, labels: Vec<String>) -> Result<Self, ShellError> {
        let needs_labels = !matches!(cmd, "show" | "close");
        if needs_labels && labels.is_empty() {
            return Err(ShellError::validation(format!(
                "Label must be provided for cmd {}.",
                cmd
            )));
        }
        match cmd {
            "hist" => Ok(PlotRequest::Hist(labels)),
            "box" => Ok(PlotRequest::Box(labels)),
            "scatter" => match labels.as_slice() {
                [x, y] => Ok(PlotRequest::Scatter {
                    x: x.clone(),
                    y: y.clone(),
                }),
                _ => Err(ShellError::validation(format!(
                    "Scatter needs exactly two labels, got {}.",
                    labels.len()
                ))),
            },
            "show" => Ok(PlotRequest::Show),
            "close" => Ok(PlotRequest::Close),
            other => Err(ShellError::validation(format!("Invalid command {}.", other))),
        }
    }

    /// Column labels the request reads from the data frame.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            PlotRequest::Hist(labels) | PlotRequest::Box(labels) => {
                labels.iter().map(String::as_str).collect()
            }
            PlotRequest::Scatter { x, y } => vec![x.as_str(), y.as_str()],
            PlotRequest::Show | PlotRequest::Close => Vec::new(),
        }
    }
}

/// How points of a scatter are marked.
#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    /// Every point drawn with `*`
    Plain,
    /// One symbol per class index, with the class names for the legend
    Classes { index: Vec<usize>, names: Vec<String> },
    /// Shaded by a continuous value, light to dark
    Shaded(Vec<f64>),
}

/// One drawable plot, holding a snapshot of the data it shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Histogram {
        label: String,
        values: Vec<f64>,
    },
    Boxplot {
        label: String,
        values: Vec<f64>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        x: Vec<f64>,
        y: Vec<f64>,
        marks: Marks,
    },
    ExplainedVariance {
        ratios: Vec<f64>,
    },
    Loadings {
        features: Vec<String>,
        components: Vec<Vec<f64>>,
    },
}

impl Plot {
    pub fn render(&self) -> String {
        match self {
            Plot::Histogram { label, values } => {
                format!("Histogram of {}\n{}", label, render_histogram(values, HIST_BINS))
            }
            Plot::Boxplot { label, values } => {
                format!("Boxplot of {}\n{}", label, render_boxplot(values))
            }
            Plot::Scatter {
                title,
                x_label,
                y_label,
                x,
                y,
                marks,
            } => format!(
                "{}\n{}",
                title,
                render_scatter(x, y, marks, x_label, y_label)
            ),
            Plot::ExplainedVariance { ratios } => render_explained_variance(ratios),
            Plot::Loadings {
                features,
                components,
            } => render_loadings(features, components),
        }
    }
}

/// Plots waiting for `show`.
#[derive(Debug, Clone, Default)]
pub struct PlotQueue {
    plots: Vec<Plot>,
}

impl PlotQueue {
    pub fn push(&mut self, plot: Plot) {
        self.plots.push(plot);
    }

    pub fn len(&self) -> usize {
        self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plots.is_empty()
    }

    /// Render and empty the queue.
    pub fn show(&mut self) -> Result<String, ShellError> {
        if self.plots.is_empty() {
            return Err(ShellError::validation("No plots to show."));
        }
        let rendered = self
            .plots
            .drain(..)
            .map(|plot| plot.render())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(rendered)
    }

    /// Discard everything queued; returns how many plots were dropped.
    pub fn close(&mut self) -> usize {
        let dropped = self.plots.len();
        self.plots.clear();
        dropped
    }
}

const BAR_WIDTH: usize = 40;

fn render_explained_variance(ratios: &[f64]) -> String {
    let mut lines = vec!["Explained Variance Ratio of PCA Components".to_string()];
    let mut cumulative = 0.0;
    for (i, ratio) in ratios.iter().enumerate() {
        cumulative += ratio;
        let filled = (ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        let marker = (cumulative.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        let bar: String = (0..BAR_WIDTH.max(marker))
            .map(|col| {
                if col < filled {
                    '#'
                } else if col + 1 == marker {
                    '|'
                } else {
                    ' '
                }
            })
            .collect();
        lines.push(format!(
            "PC{:<3} {:>7.4} {:>7.4} {}",
            i + 1,
            ratio,
            cumulative,
            bar.trim_end()
        ));
    }
    lines.push("(# individual, | cumulative)".to_string());
    lines.join("\n")
}

fn render_loadings(features: &[String], components: &[Vec<f64>]) -> String {
    let half = BAR_WIDTH / 2;
    let name_width = features.iter().map(|f| f.len()).max().unwrap_or(0);
    let mut lines = vec!["Feature Weights of PCA Components".to_string()];
    for (i, component) in components.iter().enumerate() {
        lines.push(format!("PC{}", i + 1));
        for (feature, weight) in features.iter().zip(component) {
            let len = (weight.abs().min(1.0) * half as f64).round() as usize;
            let bar = if *weight < 0.0 {
                format!("{:>width$}|", "-".repeat(len), width = half)
            } else {
                format!("{:>width$}|{}", "", "+".repeat(len), width = half)
            };
            lines.push(format!(
                "  {:<name_width$} {:>7.4} {}",
                feature,
                weight,
                bar.trim_end(),
                name_width = name_width
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_need_labels() {
        let err = PlotRequest::from_parts("box", Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Label must be provided for cmd box.");
        assert_eq!(PlotRequest::from_parts("show", Vec::new()).unwrap(), PlotRequest::Show);
        assert_eq!(PlotRequest::from_parts("close", Vec::new()).unwrap(), PlotRequest::Close);
    }

    #[test]
    fn test_scatter_takes_two_labels() {
        let request =
            PlotRequest::from_parts("scatter", vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(request.labels(), vec!["a", "b"]);
        assert!(PlotRequest::from_parts("scatter", vec!["a".into()]).is_err());
    }

    #[test]
    fn test_unknown_plot_command() {
        let err = PlotRequest::from_parts("violin", vec!["a".into()]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid command violin.");
    }

    #[test]
    fn test_show_drains_queue() {
        let mut queue = PlotQueue::default();
        assert_eq!(queue.show().unwrap_err().to_string(), "No plots to show.");
        queue.push(Plot::Histogram {
            label: "x".into(),
            values: vec![1.0, 2.0, 2.0, 3.0],
        });
        queue.push(Plot::ExplainedVariance {
            ratios: vec![0.75, 0.25],
        });
        let rendered = queue.show().unwrap();
        assert!(rendered.starts_with("Histogram of x"));
        assert!(rendered.contains("PC1"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_discards() {
        let mut queue = PlotQueue::default();
        queue.push(Plot::Boxplot {
            label: "x".into(),
            values: vec![1.0],
        });
        assert_eq!(queue.close(), 1);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_loadings_sign_bars() {
        let text = render_loadings(&["a".into(), "b".into()], &[vec![0.5, -0.5]]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].ends_with("|++++++++++"));
        assert!(lines[3].ends_with("----------|"));
    }
}
