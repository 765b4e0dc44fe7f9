use crate::meals::repo_types::MealType;

const INSTRUCTIONS: &str = r#"You are a registered dietitian specialising in blood lipids (cholesterol and triglycerides).
Analyse the food below (given as text and/or a photo) and answer in JSON.
If several foods are present, return one array element per food.

Risk rating rules:
- Prefer "Low". Ordinary home cooking and balanced meals are usually "Low".
- Use "Medium" for greasy dishes or sweets that deserve some care.
- Use "High" only for mostly fried food, very high-fat food or extremely unbalanced meals.
- Do not be overly strict.

Output only the JSON array below. Do not wrap it in markdown code fences.

[
  {
    "name": "short, specific food name",
    "risk": "High" | "Medium" | "Low",
    "reason": "short reason; for Low, say what is good about it",
    "alternatives": "a healthier alternative; for Low, e.g. 'fine as it is'",
    "frequency": "how often it is fine to eat; be positive for Low",
    "calories": number,
    "protein": number,
    "fat": number,
    "carbohydrates": number,
    "saturated_fat": number,
    "dietary_fiber": number,
    "sodium": number,
    "calcium": number,
    "iron": number,
    "vitamin_c": number,
    "vitamin_d": number,
    "cholesterol_impact": { "level": "High" | "Medium" | "Low" | "None", "reason": "short" },
    "neutral_fat_impact": { "level": "High" | "Medium" | "Low" | "None", "reason": "short" },
    "nutrition_tips": [
      { "nutrient": "name", "status": "rich" | "adequate" | "low" | "excessive", "advice": "one line" }
    ],
    "overall_advice": "one or two positive sentences about this meal"
  }
]

Units: calories in kcal; protein, fat, carbohydrates, saturated_fat and dietary_fiber in g;
sodium, calcium, iron and vitamin_c in mg; vitamin_d in µg."#;

/// Full prompt sent with every analysis request.
pub fn build_prompt(meal_type: Option<MealType>, text: &str) -> String {
    let slot = meal_type.map(MealType::label).unwrap_or("unspecified");
    let text = text.trim();
    let content = if text.is_empty() { "see the attached image" } else { text };
    format!("{INSTRUCTIONS}\n\nMeal to analyse:\nMeal slot: {slot}\nContent: {content}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_slot_and_text() {
        let p = build_prompt(Some(MealType::Breakfast), "  natto rice  ");
        assert!(p.contains("Meal slot: breakfast"));
        assert!(p.contains("Content: natto rice\n"));
        assert!(p.contains("\"neutral_fat_impact\""));
    }

    #[test]
    fn prompt_defaults_for_image_only_requests() {
        let p = build_prompt(None, "");
        assert!(p.contains("Meal slot: unspecified"));
        assert!(p.contains("Content: see the attached image"));
    }
}
