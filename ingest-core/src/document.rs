use crate::config::DataType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One synthetic document, serialized with the stable wire schema: the
/// envelope fields below plus the variant fields flattened alongside them.
/// `partitionKey` is the store's shard key and its name must match the
/// collection's configured partition key path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub partition_key: String,
    pub timestamp: DateTime<Utc>,
    pub sequence_number: u64,
    /// Filler sized so the serialized document approximates the configured
    /// target size.
    pub data: String,
    #[serde(flatten)]
    pub body: DocumentBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "documentType")]
pub enum DocumentBody {
    #[serde(rename_all = "camelCase")]
    Financial {
        transaction_id: String,
        account_number: String,
        transaction_type: String,
        amount: f64,
        currency: String,
        merchant_name: String,
        category: String,
        status: String,
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    ECommerce {
        order_id: String,
        customer_id: String,
        customer_name: String,
        email: String,
        product_name: String,
        product_category: String,
        quantity: u32,
        price: f64,
        total_amount: f64,
        shipping_address: String,
        order_status: String,
        payment_method: String,
    },
    #[serde(rename_all = "camelCase")]
    Healthcare {
        patient_id: String,
        patient_name: String,
        date_of_birth: DateTime<Utc>,
        gender: String,
        diagnosis_code: String,
        diagnosis: String,
        treatment_type: String,
        physician_name: String,
        facility_name: String,
        vital_signs: VitalSigns,
        medications: Vec<String>,
        status: String,
    },
    #[serde(rename_all = "camelCase")]
    IoT {
        device_id: String,
        device_type: String,
        location: Location,
        temperature: f64,
        humidity: f64,
        pressure: f64,
        battery_level: u8,
        signal_strength: i32,
        status: String,
        firmware: String,
        sensor_readings: BTreeMap<String, f64>,
    },
    Generic {},
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub heart_rate: u32,
    pub blood_pressure: String,
    pub temperature: f64,
    pub oxygen_saturation: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

/// Approximate serialized size of the envelope plus the typed fields for a
/// variant, excluding the filler. Healthcare and IoT carry nested structures
/// and so a larger estimate. Used to size the filler:
/// `padding = max(0, target_bytes - overhead)`.
pub fn overhead_estimate(data_type: DataType) -> usize {
    match data_type {
        DataType::Financial => 420,
        DataType::ECommerce => 520,
        DataType::Healthcare => 680,
        DataType::IoT => 660,
        DataType::Generic => 220,
    }
}

/// Filler string for a document of the given variant and target size.
pub fn padding_for(data_type: DataType, target_size_bytes: usize) -> String {
    let len = target_size_bytes.saturating_sub(overhead_estimate(data_type));
    "X".repeat(len)
}
