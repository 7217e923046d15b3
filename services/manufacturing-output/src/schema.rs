use capstone_core::{FeatureError, FeatureSchema, FeatureSlot};

/// Machine settings in the column order the ridge model and scaler were fitted on.
pub fn feature_schema() -> Result<FeatureSchema, FeatureError> {
    FeatureSchema::new(vec![
        FeatureSlot::continuous("Injection_Temperature").describe("Injection Temperature (°C)").default_value(200.0),
        FeatureSlot::continuous("Injection_Pressure").describe("Injection Pressure (bar)").default_value(80.0),
        FeatureSlot::continuous("Cycle_Time").describe("Cycle Time (s)").default_value(50.0),
        FeatureSlot::continuous("Cooling_Time").describe("Cooling Time (s)").default_value(10.0),
        FeatureSlot::continuous("Material_Viscosity").describe("Material Viscosity").default_value(1.2),
        FeatureSlot::continuous("Ambient_Temperature").describe("Ambient Temperature (°C)").default_value(25.0),
        FeatureSlot::continuous("Machine_Age").describe("Machine Age (years)").default_value(5.0),
        FeatureSlot::continuous("Operator_Experience").describe("Operator Experience (years)").default_value(3.0),
        FeatureSlot::continuous("Maintenance_Hours").describe("Maintenance Hours per Month").default_value(20.0),
        FeatureSlot::continuous("Efficiency_Ratio")
            .describe("Efficiency Ratio (Parts per Hour / Cycle Time)")
            .default_value(0.9),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_continuous_slots_with_defaults() {
        let schema = feature_schema().unwrap();
        assert_eq!(schema.len(), 10);
        assert_eq!(schema.names().next(), Some("Injection_Temperature"));
        assert_eq!(schema.names().last(), Some("Efficiency_Ratio"));
        let defaults = schema.default_inputs().unwrap();
        assert_eq!(defaults["Cycle_Time"], 50.0);
        assert_eq!(defaults["Efficiency_Ratio"], 0.9);
    }
}
