use capstone_core::{FeatureError, FeatureSchema, FeatureSlot};

/// Patient attributes, named and ordered exactly as the training columns.
pub fn feature_schema() -> Result<FeatureSchema, FeatureError> {
    FeatureSchema::new(vec![
        FeatureSlot::integer("age", 20, 90).describe("Age").default_value(50.0),
        FeatureSlot::categorical("sex", &[(1, "Male"), (0, "Female")]).describe("Sex").default_value(1.0),
        FeatureSlot::categorical(
            "chest_pain_type",
            &[(0, "Typical angina"), (1, "Atypical angina"), (2, "Non-anginal pain"), (3, "Asymptomatic")],
        )
        .describe("Chest Pain Type (0-3)")
        .default_value(0.0),
        FeatureSlot::integer("resting_blood_pressure", 80, 200)
            .describe("Resting Blood Pressure (mm Hg)")
            .default_value(120.0),
        FeatureSlot::integer("cholesterol", 100, 600).describe("Serum Cholesterol (mg/dl)").default_value(200.0),
        FeatureSlot::categorical("fasting_blood_sugar", &[(1, "True"), (0, "False")])
            .describe("Fasting Blood Sugar > 120 mg/dl")
            .default_value(1.0),
        FeatureSlot::categorical("resting_ecg", &[(0, "Normal"), (1, "ST-T wave abnormality"), (2, "Left ventricular hypertrophy")])
            .describe("Resting ECG Results (0-2)")
            .default_value(0.0),
        FeatureSlot::integer("max_heart_rate", 60, 220).describe("Maximum Heart Rate Achieved").default_value(150.0),
        FeatureSlot::categorical("exercise_induced_angina", &[(1, "Yes"), (0, "No")])
            .describe("Exercise Induced Angina")
            .default_value(1.0),
        FeatureSlot::bounded("st_depression", 0.0, 6.0)
            .describe("ST Depression Induced by Exercise")
            .default_value(1.0),
        FeatureSlot::categorical("st_slope", &[(0, "Upsloping"), (1, "Flat"), (2, "Downsloping")])
            .describe("Slope of Peak Exercise ST Segment (0-2)")
            .default_value(0.0),
        FeatureSlot::integer("num_major_vessels", 0, 3).describe("Number of Major Vessels (0-3)").default_value(0.0),
        FeatureSlot::categorical(
            "thalassemia",
            &[(0, "Normal"), (1, "Fixed defect"), (2, "Reversible defect"), (3, "Other")],
        )
        .describe("Thalassemia")
        .default_value(0.0),
    ])
}
