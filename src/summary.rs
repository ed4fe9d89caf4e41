//! Interpretive text for a variant's median ΔΔG

/// Serrano cutoff for severely destabilising mutations (kcal/mol)
pub const SERRANO_CUTOFF: f64 = 2.5;
/// Hall et al. threshold for destabilising mutations (kcal/mol)
pub const HALL_THRESHOLD: f64 = 0.5;

const SERRANO: &str = "[Serrano](https://www.crg.eu/luis_serrano)";
const HALL: &str =
    "[Hall, Shorthouse, Alcraft et al. 2023](https://www.nature.com/articles/s42003-023-05136-y)";

/// Stability band of a median ΔΔG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    SignificantlyDestabilising,
    Destabilising,
    NotDestabilising,
}

impl Band {
    pub fn classify(median: f64) -> Self {
        if median > SERRANO_CUTOFF {
            Band::SignificantlyDestabilising
        } else if median > HALL_THRESHOLD {
            Band::Destabilising
        } else {
            Band::NotDestabilising
        }
    }

    fn verdict(self) -> &'static str {
        match self {
            Band::SignificantlyDestabilising => {
                "It is greater than the Serrano value of +2.5 kcal/mol and significantly destabilising."
            }
            Band::Destabilising => {
                "It is greater than the deleterious value of +0.5 kcal/mol and destabilising."
            }
            Band::NotDestabilising => "It is not destabilising.",
        }
    }
}

/// Markdown summary for the selected variant, or `None` when there is no median
pub fn summary_text(median: Option<f64>, percentile: f64) -> Option<String> {
    let median = median?;
    let band = Band::classify(median);

    Some(format!(
        "A ΔΔG value greater than the {SERRANO} value of +2.5 kcal/mol is commonly used as a \
         cut-off for severe destabilisation. \
         Other studies, such as {HALL}, suggest a deleterious value of +0.5 kcal/mol is a \
         threshold for destabilising mutations. \
         The median ΔΔG for the selected variant is {median:.2} kcal/mol and in the \
         {percentile:.0}th percentile. {}",
        band.verdict()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        assert_eq!(Band::classify(3.0), Band::SignificantlyDestabilising);
        assert_eq!(Band::classify(2.5), Band::Destabilising);
        assert_eq!(Band::classify(1.0), Band::Destabilising);
        assert_eq!(Band::classify(0.5), Band::NotDestabilising);
        assert_eq!(Band::classify(-2.0), Band::NotDestabilising);
    }

    #[test]
    fn test_significantly_destabilising() {
        let text = summary_text(Some(3.0), 97.4).unwrap();
        assert!(text.contains("significantly destabilising"));
        assert!(text.contains("3.00 kcal/mol"));
        assert!(text.contains("97th percentile"));
    }

    #[test]
    fn test_destabilising() {
        let text = summary_text(Some(1.0), 60.0).unwrap();
        assert!(text.contains("destabilising"));
        assert!(!text.contains("significantly"));
        assert!(!text.contains("not destabilising"));
    }

    #[test]
    fn test_not_destabilising() {
        let text = summary_text(Some(0.2), 12.6).unwrap();
        assert!(text.contains("not destabilising"));
        assert!(text.contains("0.20 kcal/mol"));
        assert!(text.contains("13th percentile"));
    }

    #[test]
    fn test_no_median() {
        assert_eq!(summary_text(None, 50.0), None);
    }
}
