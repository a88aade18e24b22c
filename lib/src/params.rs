use crate::Error;

/// Parameters for one text detection run.
///
/// The defaults are empirically tuned values; override any subset with struct update syntax:
/// ```
/// # use text_regions::Params;
/// let params = Params {
///     max_component_area: 900,
///     ..Params::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Smallest stable region, in pixels
    pub min_mser_area: u32,
    /// Largest stable region, in pixels
    pub max_mser_area: u32,
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
    /// Labelling an image with more components than this is an error
    pub max_component_count: usize,
    pub min_component_area: u32,
    pub max_component_area: u32,
    pub min_eccentricity: f64,
    pub max_eccentricity: f64,
    pub min_solidity: f64,
    /// Upper bound for the std-dev / mean ratio of the stroke widths in a component
    pub max_stddev_mean_ratio: f64,
    /// Size of the elliptical closing kernel
    pub close_kernel: u32,
    /// Size of the elliptical opening kernel
    pub open_kernel: u32,
    /// Margin added around the bounding rectangle
    pub margin: u32,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            min_mser_area: 10,
            max_mser_area: 2000,
            canny_low: 20.0,
            canny_high: 100.0,
            max_component_count: 3000,
            min_component_area: 75,
            max_component_area: 600,
            min_eccentricity: 0.1,
            max_eccentricity: 0.995,
            min_solidity: 0.4,
            max_stddev_mean_ratio: 0.5,
            close_kernel: 25,
            open_kernel: 7,
            margin: 5,
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(name, format!("{} is not a finite non-negative number", value)));
    }
    Ok(())
}

fn check_order<T: PartialOrd + std::fmt::Display>(
    name: &'static str,
    min: T,
    max: T,
) -> Result<(), Error> {
    if min > max {
        return Err(invalid(name, format!("minimum {} exceeds maximum {}", min, max)));
    }
    Ok(())
}

fn check_kernel(name: &'static str, size: u32) -> Result<(), Error> {
    // kernel radius must fit the u8 radius imageproc's morphology takes
    if size == 0 || size > 511 {
        return Err(invalid(name, format!("kernel size {} not in 1..=511", size)));
    }
    Ok(())
}

impl Params {
    /// Check that all bounds are non-negative and that every min / max pair is ordered.
    /// # Errors
    /// `Error::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        check_order("mser_area", self.min_mser_area, self.max_mser_area)?;

        check_non_negative("canny_low", self.canny_low as f64)?;
        check_non_negative("canny_high", self.canny_high as f64)?;
        check_order("canny", self.canny_low, self.canny_high)?;

        if self.max_component_count == 0 {
            return Err(invalid("max_component_count", "must be at least 1"));
        }
        check_order(
            "component_area",
            self.min_component_area,
            self.max_component_area,
        )?;

        check_non_negative("min_eccentricity", self.min_eccentricity)?;
        check_non_negative("max_eccentricity", self.max_eccentricity)?;
        if self.max_eccentricity > 1.0 {
            return Err(invalid("max_eccentricity", "eccentricity is at most 1"));
        }
        check_order("eccentricity", self.min_eccentricity, self.max_eccentricity)?;

        check_non_negative("min_solidity", self.min_solidity)?;
        check_non_negative("max_stddev_mean_ratio", self.max_stddev_mean_ratio)?;

        check_kernel("close_kernel", self.close_kernel)?;
        check_kernel("open_kernel", self.open_kernel)?;
        Ok(())
    }
}
