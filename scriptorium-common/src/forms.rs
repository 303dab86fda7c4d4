//! Assembly and validation of task-creation requests
//!
//! Each form turns what the operator picked into the request body the
//! backend expects, or a [`FormError`] whose text is shown verbatim.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{
    AlignTaskCreate, DraftTaskCreate, ParatextProject, Scripture, Task, TrainMode,
    TrainTaskCreate,
};

/// Form validation failure; the message is user-facing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please select at least one scripture file")]
    NoScriptures,

    #[error("Please provide at least one language code mapping")]
    NoLangCodes,

    #[error("Please select a source project and at least one book.")]
    DraftSelectionIncomplete,

    #[error("The selected project's language was not included in the training data. This is almost certainly not what you wanted to do.")]
    LanguageNotTrained,

    #[error("Could not determine target project ID from task. This task may not support draft creation.")]
    MissingTargetProject,
}

impl From<FormError> for crate::Error {
    fn from(e: FormError) -> Self {
        crate::Error::InvalidInput(e.to_string())
    }
}

/// Scripture file name the backend derives for a project
pub fn scripture_filename_for(project: &ParatextProject) -> String {
    format!("{}-{}", project.iso_code, project.id)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignForm {
    pub source_scripture_files: Vec<String>,
}

impl AlignForm {
    /// Keep selected ids that name a known scripture, in selection order
    pub fn build(
        &self,
        project: &ParatextProject,
        scriptures: &[Scripture],
    ) -> Result<AlignTaskCreate, FormError> {
        let sources: Vec<String> = self
            .source_scripture_files
            .iter()
            .filter(|id| scriptures.iter().any(|s| &s.id == *id))
            .cloned()
            .collect();

        if sources.is_empty() {
            return Err(FormError::NoScriptures);
        }

        Ok(AlignTaskCreate {
            project_id: project.id.clone(),
            target_scripture_file: scripture_filename_for(project),
            source_scripture_files: sources,
        })
    }
}

/// Distinct language codes needing a mapping: the project's first, then
/// those of the selected scriptures
pub fn unique_lang_codes(
    project: &ParatextProject,
    selected: &[String],
    scriptures: &[Scripture],
) -> Vec<String> {
    let mut codes = vec![project.iso_code.clone()];
    for id in selected {
        if let Some(scripture) = scriptures.iter().find(|s| &s.id == id) {
            if !codes.contains(&scripture.lang_code) {
                codes.push(scripture.lang_code.clone());
            }
        }
    }
    codes
}

/// Marker submitted in place of an option value when "Custom" is chosen
pub const CUSTOM_CHOICE: &str = "__custom__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangCodeSelection {
    Option(String),
    Custom(String),
}

/// One row of the language-code mapping form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangCodeOption {
    pub lang_code: String,
    pub display_name: String,
    /// Script-qualified codes suggested by the backend
    pub options: Vec<String>,
    pub selection: LangCodeSelection,
}

impl LangCodeOption {
    /// Row state from submitted form values
    ///
    /// With no choice submitted the first suggested option is preselected,
    /// or an empty custom value when there are no suggestions.
    pub fn from_form(
        lang_code: &str,
        options: Vec<String>,
        choice: Option<&str>,
        custom: Option<&str>,
    ) -> Self {
        let selection = match choice {
            Some(CUSTOM_CHOICE) => LangCodeSelection::Custom(custom.unwrap_or_default().to_string()),
            Some(value) if !value.is_empty() => LangCodeSelection::Option(value.to_string()),
            _ => match options.first() {
                Some(first) => LangCodeSelection::Option(first.clone()),
                None => LangCodeSelection::Custom(custom.unwrap_or_default().to_string()),
            },
        };

        Self {
            lang_code: lang_code.to_string(),
            display_name: lang_code.to_string(),
            options,
            selection,
        }
    }

    pub fn is_selected(&self, option: &str) -> bool {
        matches!(&self.selection, LangCodeSelection::Option(v) if v == option)
    }
}

/// `lang_code -> script code` mapping; custom values are trimmed and blanks skipped
pub fn resolve_lang_codes(options: &[LangCodeOption]) -> BTreeMap<String, String> {
    options
        .iter()
        .filter_map(|opt| {
            let value = match &opt.selection {
                LangCodeSelection::Option(v) => v.as_str(),
                LangCodeSelection::Custom(v) => v.trim(),
            };
            (!value.is_empty()).then(|| (opt.lang_code.clone(), value.to_string()))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainForm {
    pub training_corpus: String,
    pub source_scripture_files: Vec<String>,
    pub lang_codes: BTreeMap<String, String>,
    pub train_mode: Option<TrainMode>,
}

impl TrainForm {
    pub fn build(&self, project: &ParatextProject) -> Result<TrainTaskCreate, FormError> {
        if self.lang_codes.is_empty() {
            return Err(FormError::NoLangCodes);
        }

        Ok(TrainTaskCreate {
            project_id: project.id.clone(),
            source_scripture_files: self.source_scripture_files.clone(),
            training_corpus: self.training_corpus.trim().to_string(),
            lang_codes: self.lang_codes.clone(),
            train_mode: self.train_mode,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub source_project_id: Option<String>,
    pub book_names: Vec<String>,
}

impl DraftForm {
    /// Validate against the train task and the chosen source project
    pub fn build(
        &self,
        train_task: &Task,
        source_project: Option<&ParatextProject>,
    ) -> Result<DraftTaskCreate, FormError> {
        let project = match source_project {
            Some(p) if !self.book_names.is_empty() => p,
            _ => return Err(FormError::DraftSelectionIncomplete),
        };

        let params = train_task.train_params().unwrap_or_default();

        let source_script_code = params
            .lang_codes
            .get(&project.iso_code)
            .cloned()
            .ok_or(FormError::LanguageNotTrained)?;

        if params.project_id.is_empty() {
            return Err(FormError::MissingTargetProject);
        }

        let target_script_code = params
            .lang_codes
            .get(params.target_iso_code())
            .cloned()
            .unwrap_or_default();

        Ok(DraftTaskCreate {
            experiment_name: params.experiment_name,
            train_task_id: train_task.id.clone(),
            source_project_id: project.id.clone(),
            book_names: self.book_names.clone(),
            source_script_code,
            target_script_code,
        })
    }
}

/// Candidate source projects for a new draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftSourceProjects {
    /// Projects whose text was used in training
    pub from_training: Vec<ParatextProject>,
    pub others: Vec<ParatextProject>,
}

impl DraftSourceProjects {
    pub fn assemble(from_training: Vec<ParatextProject>, all: &[ParatextProject]) -> Self {
        let mut training: Vec<ParatextProject> = Vec::with_capacity(from_training.len());
        for project in from_training {
            if !training.iter().any(|p| p.id == project.id) {
                training.push(project);
            }
        }
        sort_by_name(&mut training);

        let mut others: Vec<ParatextProject> = all
            .iter()
            .filter(|p| !training.iter().any(|t| t.id == p.id))
            .cloned()
            .collect();
        sort_by_name(&mut others);

        Self {
            from_training: training,
            others,
        }
    }

    /// Look a project up in either list
    pub fn find(&self, id: &str) -> Option<&ParatextProject> {
        self.from_training
            .iter()
            .chain(self.others.iter())
            .find(|p| p.id == id)
    }
}

fn sort_by_name(projects: &mut [ParatextProject]) {
    projects.sort_by_key(|p| p.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project(id: &str, name: &str, iso: &str) -> ParatextProject {
        serde_json::from_value(json!({"id": id, "name": name, "iso_code": iso})).unwrap()
    }

    fn scripture(id: &str, lang: &str) -> Scripture {
        serde_json::from_value(json!({"id": id, "name": id, "lang_code": lang})).unwrap()
    }

    fn train_task(params: serde_json::Value) -> Task {
        serde_json::from_value(json!({
            "id": "train-1",
            "kind": "train",
            "status": "completed",
            "parameters": params,
        }))
        .unwrap()
    }

    #[test]
    fn test_scripture_filename() {
        assert_eq!(scripture_filename_for(&project("P1", "x", "abc")), "abc-P1");
    }

    #[test]
    fn test_align_form_filters_unknown_ids() {
        let scriptures = vec![scripture("en-NIV84", "en"), scripture("en-NLT", "en")];
        let form = AlignForm {
            source_scripture_files: vec!["en-NLT".into(), "gone".into(), "en-NIV84".into()],
        };
        let body = form.build(&project("P1", "x", "abc"), &scriptures).unwrap();
        assert_eq!(body.target_scripture_file, "abc-P1");
        assert_eq!(body.source_scripture_files, vec!["en-NLT", "en-NIV84"]);

        let empty = AlignForm {
            source_scripture_files: vec!["gone".into()],
        };
        assert_eq!(
            empty.build(&project("P1", "x", "abc"), &scriptures),
            Err(FormError::NoScriptures)
        );
    }

    #[test]
    fn test_unique_lang_codes_project_first() {
        let scriptures = vec![
            scripture("en-NIV84", "en"),
            scripture("en-NLT", "en"),
            scripture("fr-LSG", "fr"),
            scripture("abc-X", "abc"),
        ];
        let selected: Vec<String> = vec!["en-NIV84", "abc-X", "fr-LSG", "en-NLT", "missing"]
            .into_iter()
            .map(String::from)
            .collect();
        let codes = unique_lang_codes(&project("P", "p", "abc"), &selected, &scriptures);
        assert_eq!(codes, vec!["abc", "en", "fr"]);
    }

    #[test]
    fn test_lang_code_option_from_form() {
        let opts = vec!["eng_Latn".to_string(), "eng_Cyrl".to_string()];
        let default = LangCodeOption::from_form("en", opts.clone(), None, None);
        assert!(default.is_selected("eng_Latn"));

        let chosen = LangCodeOption::from_form("en", opts.clone(), Some("eng_Cyrl"), None);
        assert!(chosen.is_selected("eng_Cyrl"));

        let custom = LangCodeOption::from_form("en", opts, Some(CUSTOM_CHOICE), Some(" x_Y "));
        assert_eq!(custom.selection, LangCodeSelection::Custom(" x_Y ".to_string()));

        let no_opts = LangCodeOption::from_form("zz", vec![], None, None);
        assert_eq!(no_opts.selection, LangCodeSelection::Custom(String::new()));
    }

    #[test]
    fn test_resolve_lang_codes_trims_and_skips_blank() {
        let options = vec![
            LangCodeOption::from_form("en", vec!["eng_Latn".into()], None, None),
            LangCodeOption::from_form("fr", vec![], Some(CUSTOM_CHOICE), Some("  fra_Latn ")),
            LangCodeOption::from_form("zz", vec![], Some(CUSTOM_CHOICE), Some("   ")),
        ];
        let map = resolve_lang_codes(&options);
        assert_eq!(map.len(), 2);
        assert_eq!(map["en"], "eng_Latn");
        assert_eq!(map["fr"], "fra_Latn");
    }

    #[test]
    fn test_train_form() {
        let p = project("P", "p", "abc");
        assert_eq!(TrainForm::default().build(&p), Err(FormError::NoLangCodes));

        let mut form = TrainForm {
            training_corpus: "  ".into(),
            source_scripture_files: vec!["en-NIV84".into()],
            ..Default::default()
        };
        form.lang_codes.insert("abc".into(), "abc_Latn".into());
        let body = form.build(&p).unwrap();
        assert_eq!(body.training_corpus, "");
        assert_eq!(body.project_id, "P");
        assert!(body.train_mode.is_none());
    }

    #[test]
    fn test_draft_form_validation_order() {
        let task = train_task(json!({
            "project_id": "TGT",
            "target_scripture_file": "tgt-TGT",
            "experiment_name": "exp-1",
            "lang_codes": {"en": "eng_Latn", "tgt": "tgt_Latn"}
        }));
        let english = project("ENP", "English", "en");
        let french = project("FRP", "French", "fr");

        let no_books = DraftForm {
            source_project_id: Some("ENP".into()),
            book_names: vec![],
        };
        assert_eq!(
            no_books.build(&task, Some(&english)),
            Err(FormError::DraftSelectionIncomplete)
        );

        let form = DraftForm {
            source_project_id: Some("FRP".into()),
            book_names: vec!["MAT".into()],
        };
        assert_eq!(form.build(&task, None), Err(FormError::DraftSelectionIncomplete));
        assert_eq!(form.build(&task, Some(&french)), Err(FormError::LanguageNotTrained));

        let body = form.build(&task, Some(&english)).unwrap();
        assert_eq!(body.source_script_code, "eng_Latn");
        assert_eq!(body.target_script_code, "tgt_Latn");
        assert_eq!(body.experiment_name, "exp-1");
        assert_eq!(body.train_task_id, "train-1");
        assert_eq!(body.source_project_id, "ENP");
    }

    #[test]
    fn test_draft_form_missing_project_and_target_code() {
        let no_project = train_task(json!({"lang_codes": {"en": "eng_Latn"}}));
        let form = DraftForm {
            source_project_id: Some("ENP".into()),
            book_names: vec!["MAT".into()],
        };
        let english = project("ENP", "English", "en");
        assert_eq!(
            form.build(&no_project, Some(&english)),
            Err(FormError::MissingTargetProject)
        );

        let no_target = train_task(json!({
            "project_id": "TGT",
            "target_scripture_file": "xyz-TGT",
            "lang_codes": {"en": "eng_Latn"}
        }));
        let body = form.build(&no_target, Some(&english)).unwrap();
        assert_eq!(body.target_script_code, "");
    }

    #[test]
    fn test_draft_source_projects_assemble() {
        let training = vec![
            project("B", "beta", "b"),
            project("A", "Alpha", "a"),
            project("B", "beta", "b"),
        ];
        let all = vec![
            project("A", "Alpha", "a"),
            project("Z", "zulu", "z"),
            project("C", "Charlie", "c"),
            project("B", "beta", "b"),
        ];
        let lists = DraftSourceProjects::assemble(training, &all);
        let training_ids: Vec<_> = lists.from_training.iter().map(|p| p.id.as_str()).collect();
        let other_ids: Vec<_> = lists.others.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(training_ids, vec!["A", "B"]);
        assert_eq!(other_ids, vec!["C", "Z"]);
        assert_eq!(lists.find("Z").unwrap().name, "zulu");
        assert!(lists.find("Q").is_none());
    }

    #[test]
    fn test_form_error_messages() {
        assert_eq!(
            FormError::DraftSelectionIncomplete.to_string(),
            "Please select a source project and at least one book."
        );
        let err: crate::Error = FormError::NoScriptures.into();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
    }
}
