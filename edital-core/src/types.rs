use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Schema version stamped on every report. Bump when the report layout changes.
pub const SCHEMA_VERSION: &str = "1.0";

// ===== DOCUMENT OUTLINE =====

/// A node in the edital outline, e.g. "3.5.2 Da cota reservada".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Dotted numeric path ("3", "3.5", "3.5.2")
    pub number: String,
    pub title: String,
    /// Text belonging to this node, up to the next sibling or ancestor heading
    pub content: String,
    /// Depth: dot count + 1
    pub level: u32,
}

impl Section {
    pub fn new(number: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let number = number.into();
        let level = number.matches('.').count() as u32 + 1;
        Self {
            number,
            title: title.into(),
            content: content.into(),
            level,
        }
    }
}

// ===== FIELD SCHEMA =====

/// The closed vocabulary of checklist attributes.
///
/// Declaration order is the canonical order used by [`FieldMap`] iteration and
/// JSON export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    ObjetoDescricao,
    FormaObjeto,
    ValorLicitacao,
    RegistroPreco,
    CriterioJulgamento,
    PrecoBase,
    EscopoJulgamento,
    ModoDisputa,
    IntervaloMinimo,
    LanceIntermediario,
    OrcamentoSigiloso,
    OrcamentoPublico,
    ClassePrazo,
    PncpPublicacao,
    PncpPrazo,
    PncpIntencao,
    PncpPrazoIntencao,
    PrazoRecursal,
    PrazoImpugnacao,
    PrazoEsclarecimento,
    PrazoPropostaInicio,
    PrazoPropostaFim,
    PrazoHabilitacao,
    PreferenciaMe,
    ExclusivaMe,
    SubcontratacaoMe,
    Cota25Me,
    CriterioDesempateMe,
    CriterioDesempate,
    CriterioDesempateSorteio,
    BeneficioLocal,
    Margem25,
    Margem10,
    GarantiaContratual,
    GarantiaParticipacao,
    Amostras,
    Demonstracao,
    Visita,
    VisitaObrigatoria,
    Cooperativas,
    Consorcio,
}

impl Field {
    pub const ALL: [Field; 41] = [
        Field::ObjetoDescricao,
        Field::FormaObjeto,
        Field::ValorLicitacao,
        Field::RegistroPreco,
        Field::CriterioJulgamento,
        Field::PrecoBase,
        Field::EscopoJulgamento,
        Field::ModoDisputa,
        Field::IntervaloMinimo,
        Field::LanceIntermediario,
        Field::OrcamentoSigiloso,
        Field::OrcamentoPublico,
        Field::ClassePrazo,
        Field::PncpPublicacao,
        Field::PncpPrazo,
        Field::PncpIntencao,
        Field::PncpPrazoIntencao,
        Field::PrazoRecursal,
        Field::PrazoImpugnacao,
        Field::PrazoEsclarecimento,
        Field::PrazoPropostaInicio,
        Field::PrazoPropostaFim,
        Field::PrazoHabilitacao,
        Field::PreferenciaMe,
        Field::ExclusivaMe,
        Field::SubcontratacaoMe,
        Field::Cota25Me,
        Field::CriterioDesempateMe,
        Field::CriterioDesempate,
        Field::CriterioDesempateSorteio,
        Field::BeneficioLocal,
        Field::Margem25,
        Field::Margem10,
        Field::GarantiaContratual,
        Field::GarantiaParticipacao,
        Field::Amostras,
        Field::Demonstracao,
        Field::Visita,
        Field::VisitaObrigatoria,
        Field::Cooperativas,
        Field::Consorcio,
    ];

    /// JSON key, identical to the serde name.
    pub fn key(self) -> &'static str {
        match self {
            Field::ObjetoDescricao => "objetoDescricao",
            Field::FormaObjeto => "formaObjeto",
            Field::ValorLicitacao => "valorLicitacao",
            Field::RegistroPreco => "registroPreco",
            Field::CriterioJulgamento => "criterioJulgamento",
            Field::PrecoBase => "precoBase",
            Field::EscopoJulgamento => "escopoJulgamento",
            Field::ModoDisputa => "modoDisputa",
            Field::IntervaloMinimo => "intervaloMinimo",
            Field::LanceIntermediario => "lanceIntermediario",
            Field::OrcamentoSigiloso => "orcamentoSigiloso",
            Field::OrcamentoPublico => "orcamentoPublico",
            Field::ClassePrazo => "classePrazo",
            Field::PncpPublicacao => "pncpPublicacao",
            Field::PncpPrazo => "pncpPrazo",
            Field::PncpIntencao => "pncpIntencao",
            Field::PncpPrazoIntencao => "pncpPrazoIntencao",
            Field::PrazoRecursal => "prazoRecursal",
            Field::PrazoImpugnacao => "prazoImpugnacao",
            Field::PrazoEsclarecimento => "prazoEsclarecimento",
            Field::PrazoPropostaInicio => "prazoPropostaInicio",
            Field::PrazoPropostaFim => "prazoPropostaFim",
            Field::PrazoHabilitacao => "prazoHabilitacao",
            Field::PreferenciaMe => "preferenciaMe",
            Field::ExclusivaMe => "exclusivaMe",
            Field::SubcontratacaoMe => "subcontratacaoMe",
            Field::Cota25Me => "cota25Me",
            Field::CriterioDesempateMe => "criterioDesempateMe",
            Field::CriterioDesempate => "criterioDesempate",
            Field::CriterioDesempateSorteio => "criterioDesempateSorteio",
            Field::BeneficioLocal => "beneficioLocal",
            Field::Margem25 => "margem25",
            Field::Margem10 => "margem10",
            Field::GarantiaContratual => "garantiaContratual",
            Field::GarantiaParticipacao => "garantiaParticipacao",
            Field::Amostras => "amostras",
            Field::Demonstracao => "demonstracao",
            Field::Visita => "visita",
            Field::VisitaObrigatoria => "visitaObrigatoria",
            Field::Cooperativas => "cooperativas",
            Field::Consorcio => "consorcio",
        }
    }

    /// Human label shown next to findings.
    pub fn label(self) -> &'static str {
        match self {
            Field::ObjetoDescricao => "Objeto",
            Field::FormaObjeto => "Forma do Objeto",
            Field::ValorLicitacao => "Valor da Licitação",
            Field::RegistroPreco => "Registro de Preço",
            Field::CriterioJulgamento => "Critério de Julgamento",
            Field::PrecoBase => "Preço-base",
            Field::EscopoJulgamento => "Escopo do Julgamento",
            Field::ModoDisputa => "Modo de Disputa",
            Field::IntervaloMinimo => "Intervalo Mínimo",
            Field::LanceIntermediario => "Lance Intermediário",
            Field::OrcamentoSigiloso => "Orçamento Sigiloso",
            Field::OrcamentoPublico => "Orçamento Público",
            Field::ClassePrazo => "Classe de Prazo",
            Field::PncpPublicacao => "PNCP - Publicação",
            Field::PncpPrazo => "PNCP - Prazo",
            Field::PncpIntencao => "PNCP - Intenção",
            Field::PncpPrazoIntencao => "PNCP - Prazo Intenção",
            Field::PrazoRecursal => "Prazo Recursal",
            Field::PrazoImpugnacao => "Prazo de Impugnação",
            Field::PrazoEsclarecimento => "Prazo de Esclarecimento",
            Field::PrazoPropostaInicio => "Início do Prazo de Proposta",
            Field::PrazoPropostaFim => "Fim do Prazo de Proposta",
            Field::PrazoHabilitacao => "Prazo de Habilitação",
            Field::PreferenciaMe => "Preferência ME/EPP",
            Field::ExclusivaMe => "Exclusiva ME/EPP",
            Field::SubcontratacaoMe => "Subcontratação ME/EPP",
            Field::Cota25Me => "Cota 25% ME/EPP",
            Field::CriterioDesempateMe => "Desempate ME/EPP",
            Field::CriterioDesempate => "Critério de Desempate",
            Field::CriterioDesempateSorteio => "Desempate por Sorteio",
            Field::BeneficioLocal => "Benefício Local",
            Field::Margem25 => "Margem de Preferência 25%",
            Field::Margem10 => "Margem de Preferência 10%",
            Field::GarantiaContratual => "Garantia Contratual",
            Field::GarantiaParticipacao => "Garantia de Participação",
            Field::Amostras => "Amostras",
            Field::Demonstracao => "Demonstração",
            Field::Visita => "Visita",
            Field::VisitaObrigatoria => "Visita Obrigatória",
            Field::Cooperativas => "Cooperativas",
            Field::Consorcio => "Consórcio",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field name: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Checklist values keyed by [`Field`].
///
/// A missing key means "undetermined". Empty values are never stored, so an
/// explicit negative ("nao", "0") is always distinguishable from absence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<Field, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// True when the field holds exactly `value`.
    pub fn is(&self, field: Field, value: &str) -> bool {
        self.get(field) == Some(value)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Store a value, overwriting any previous one. Blank values unset the field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl<V: Into<String>> FromIterator<(Field, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (Field, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (field, value) in iter {
            map.set(field, value);
        }
        map
    }
}

// ===== EXTRACTION OUTPUT =====

/// Where an extracted value came from in the edital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub field: Field,
    /// Matched text, trimmed
    pub snippet: String,
    /// Snippet plus surrounding text, clipped to the document
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: FieldMap,
    pub sources: Vec<SourceAttribution>,
}

impl ExtractionResult {
    /// First attribution recorded for a field.
    pub fn source_for(&self, field: Field) -> Option<&SourceAttribution> {
        self.sources.iter().find(|source| source.field == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Deterministic pattern rules
    Pattern,
    /// External collaborator (e.g. a language model service)
    Alternate,
}

// ===== RULE OUTCOMES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Ok,
    Warning,
}

/// Section of this document that backs a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub number: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    /// Stable identifier ("rule-1" .. "rule-30")
    pub id: String,
    pub title: String,
    pub status: RuleStatus,
    pub message: String,
    /// Legal citation
    pub legal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    /// Primary field the evaluator inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    /// Customary item of the model edital the finding concerns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edital_reference: Option<String>,
    /// Section of the analysed document, filled in by the processor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SectionRef>,
}

impl RuleOutcome {
    pub fn ok(id: &str, title: &str, message: impl Into<String>, legal: &str) -> Self {
        Self::with_status(id, title, RuleStatus::Ok, message, legal)
    }

    pub fn warning(id: &str, title: &str, message: impl Into<String>, legal: &str) -> Self {
        Self::with_status(id, title, RuleStatus::Warning, message, legal)
    }

    fn with_status(
        id: &str,
        title: &str,
        status: RuleStatus,
        message: impl Into<String>,
        legal: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status,
            message: message.into(),
            legal: legal.to_string(),
            guidance: None,
            field: None,
            edital_reference: None,
            source: None,
        }
    }

    pub fn guidance(mut self, guidance: &str) -> Self {
        self.guidance = Some(guidance.to_string());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.edital_reference = Some(reference.to_string());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.status == RuleStatus::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_match_serde_names() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("cota25Me".parse::<Field>(), Ok(Field::Cota25Me));
        assert!("registroPrecos".parse::<Field>().is_err());
    }

    #[test]
    fn test_field_map_blank_value_unsets() {
        let mut map = FieldMap::new();
        map.set(Field::RegistroPreco, "sim");
        assert!(map.is(Field::RegistroPreco, "sim"));

        map.set(Field::RegistroPreco, "  ");
        assert!(!map.contains(Field::RegistroPreco));
        assert!(map.is_empty());
    }

    #[test]
    fn test_field_map_iterates_in_declaration_order() {
        let map: FieldMap = [
            (Field::Consorcio, "vedado"),
            (Field::ObjetoDescricao, "Aquisição de materiais"),
            (Field::PncpPrazo, "8"),
        ]
        .into_iter()
        .collect();

        let keys: Vec<Field> = map.iter().map(|(field, _)| field).collect();
        assert_eq!(keys, vec![Field::ObjetoDescricao, Field::PncpPrazo, Field::Consorcio]);
    }

    #[test]
    fn test_section_level_from_number() {
        assert_eq!(Section::new("3", "DA PARTICIPAÇÃO", "").level, 1);
        assert_eq!(Section::new("3.5.2", "Da cota", "").level, 3);
    }
}
