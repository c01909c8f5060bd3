use crate::errors::IntakeError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use sheets::CellValue;
use std::fmt;
use std::str::FromStr;

/// Column titles written as the first row of every new worksheet.
pub const HEADER_ROW: [&str; 4] = ["Teacher Name", "Student Name", "Amount", "Tag"];

/// Category code selecting the worksheet a payment is logged in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    Hsc26,
    Hsc25,
    Ssc26,
    Ssc27,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Hsc26, Tag::Hsc25, Tag::Ssc26, Tag::Ssc27];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Tag::Hsc26 => "HSC26",
            Tag::Hsc25 => "HSC25",
            Tag::Ssc26 => "SSC26",
            Tag::Ssc27 => "SSC27",
        }
    }

    /// The worksheet that collects payments for this tag.
    pub const fn worksheet(&self) -> &'static str {
        match self {
            Tag::Hsc26 => "Sheet1",
            Tag::Hsc25 => "Sheet2",
            Tag::Ssc26 => "Sheet3",
            Tag::Ssc27 => "Sheet4",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| IntakeError::InvalidTag(s.to_string()))
    }
}

/// Request body of `POST /submit-payment/`, before the tag is checked.
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub teacher_name: String,
    pub student_name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub tag: String,
}

/// A payment whose tag is known to map to a worksheet.
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentRecord {
    pub teacher_name: String,
    pub student_name: String,
    pub amount: f64,
    pub tag: Tag,
}

impl TryFrom<PaymentInput> for PaymentRecord {
    type Error = IntakeError;

    fn try_from(input: PaymentInput) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            tag: input.tag.parse()?,
            teacher_name: input.teacher_name,
            student_name: input.student_name,
            amount: input.amount,
        })
    }
}

impl PaymentRecord {
    /// Cells in `HEADER_ROW` order.
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::from(self.teacher_name.as_str()),
            CellValue::from(self.student_name.as_str()),
            CellValue::from(self.amount),
            CellValue::from(self.tag.as_str()),
        ]
    }
}

/// Confirmation returned for a stored payment.
#[derive(Debug, PartialEq, Serialize)]
pub struct Receipt {
    pub message: String,
    pub tag: Tag,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

// Accepts `1500`, `1500.5` and `"1500.5"`.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Amount::deserialize(deserializer) {
        Ok(Amount::Number(n)) => Ok(n),
        Ok(Amount::Text(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| D::Error::custom(format!("amount must be a number, got {s:?}"))),
        Err(_) => Err(D::Error::custom("amount must be a number")),
    }
}
