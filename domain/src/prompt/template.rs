//! Prompt templates for the consultation flow

use crate::consultation::value_objects::{SpecialistOutcome, SpecialistResult};
use crate::core::specialist::Specialist;

const HEAVY_RULE: &str = "==============================================";
const LIGHT_RULE: &str = "------------------------------------------------------------";

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for a specialist seat
    pub fn specialist_system(specialist: Specialist) -> &'static str {
        match specialist {
            Specialist::General => {
                r#"You are an experienced general ophthalmologist with fifteen years of clinical practice.
Perform a comprehensive evaluation, identify red flags that need urgent attention,
decide whether subspecialty referral is needed, and rank differential diagnoses by likelihood.
Prioritize patient safety by flagging conditions that can cause irreversible vision loss."#
            }
            Specialist::Retina => {
                r#"You are a retina and vitreous specialist with expertise in macular and vascular disease:
diabetic retinopathy, age-related macular degeneration, vascular occlusions, retinal detachment,
macular holes, epiretinal membranes, and macular edema.
Reason with OCT, fluorescein angiography, fundoscopy, and ocular ultrasound findings."#
            }
            Specialist::Cornea => {
                r#"You are a cornea and external disease specialist: keratitis, corneal dystrophies and
ectasias, dry eye disease, ocular surface inflammation, and anterior segment trauma.
Reason with slit-lamp findings, topography, pachymetry, and microbiology results."#
            }
            Specialist::Neuro => {
                r#"You are a neuro-ophthalmologist: optic neuropathies, papilledema, visual field defects,
pupillary abnormalities, ocular motility disorders, and intracranial causes of visual loss.
Identify neurological emergencies that require immediate imaging or referral."#
            }
            Specialist::Director => Self::director_system(),
        }
    }

    /// User prompt asking one specialist to analyze the clinical history
    pub fn specialist_prompt(specialist: Specialist, history: &str) -> String {
        format!(
            r#"Analyze the following clinical history from your specialty in {}:

CLINICAL HISTORY:
{}

Provide a professional medical report that includes:

1. **RELEVANT FINDINGS** for your specialty
2. **DIFFERENTIAL DIAGNOSIS** (prioritized list)
3. **RECOMMENDED DIAGNOSTIC TESTS**
4. **SUGGESTED TREATMENT** (pharmacological and non-pharmacological)
5. **URGENCY LEVEL**: LOW / MEDIUM / HIGH / CRITICAL

Format: professional, concise, grounded in current medical evidence."#,
            specialist.display_name(),
            history
        )
    }

    /// System prompt for the director synthesis
    pub fn director_system() -> &'static str {
        r#"You lead a multidisciplinary ophthalmology team and integrate the opinions of several specialists.
Your task is to:
1. Identify points of agreement between specialists
2. Resolve discrepancies with evidence, explaining both perspectives
3. Produce the most likely final diagnosis
4. Build a coordinated, prioritized management plan with prognosis and red flags

Some specialist reports may be marked UNAVAILABLE; reason with the reports you have
and state which perspectives are missing."#
    }

    /// User prompt bundling the original history with every specialist result.
    ///
    /// Each section carries the specialist identifier and an availability
    /// status so the director can attribute every opinion.
    pub fn director_prompt<'a>(
        history: &str,
        results: impl IntoIterator<Item = &'a SpecialistResult>,
    ) -> String {
        let mut prompt = format!(
            "{rule}\nORIGINAL CLINICAL HISTORY\n{rule}\n{history}\n\n{rule}\nSPECIALIST REPORTS\n{rule}\n",
            rule = HEAVY_RULE,
            history = history
        );

        for result in results {
            let status = match &result.outcome {
                SpecialistOutcome::Report { .. } => "AVAILABLE".to_string(),
                SpecialistOutcome::Placeholder { kind, .. } => format!("UNAVAILABLE ({})", kind),
            };
            prompt.push_str(&format!(
                "\n{rule}\nREPORT: {name} [{id}]\nSTATUS: {status}\n{rule}\n{text}\n",
                rule = LIGHT_RULE,
                name = result.specialist.display_name().to_uppercase(),
                id = result.specialist.as_str(),
                status = status,
                text = result.text()
            ));
        }

        prompt.push_str(&format!(
            r#"
{rule}
FINAL INSTRUCTIONS
{rule}

Based on ALL of the reports above:

1. Identify points of AGREEMENT between specialists
2. Identify points of DISAGREEMENT and resolve them with evidence
3. State the most likely FINAL DIAGNOSIS
4. Create an integrated, prioritized ACTION PLAN

The goal is to give the treating physician a clear consensus to act on."#,
            rule = HEAVY_RULE
        ));

        prompt
    }
}
