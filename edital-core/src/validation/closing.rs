// Habilitation, publication deadlines and budget (rule-20 .. rule-30)

use super::engine::{Evaluator, Phase};
use super::numeric::{field_int, leading_decimal};
use crate::types::{Field, FieldMap, RuleOutcome};

const LEI_14133_ART_24: &str = "Art. 24, Lei 14.133/2021";
const LEI_14133_ART_63: &str = "Art. 63, Lei 14.133/2021";
const BUDGET_ITEM: &str = "Item sobre orçamento";

/// Bid guarantee cap, percent of the estimated value (Art. 58).
const BID_GUARANTEE_CAP: f64 = 1.0;
/// Contract guarantee: up to 5%, up to 10% when justified (Art. 98).
const CONTRACT_GUARANTEE_CAP: f64 = 5.0;
const CONTRACT_GUARANTEE_JUSTIFIED_CAP: f64 = 10.0;

const PNCP_MIN_DAYS: i64 = 8;
const APPEAL_MIN_DAYS: i64 = 3;

pub(super) const EVALUATORS: &[Evaluator] = &[
    Evaluator { id: "rule-20", phase: Phase::Habilitation, eval: site_visit },
    Evaluator { id: "rule-21", phase: Phase::Habilitation, eval: small_business_habilitation },
    Evaluator { id: "rule-22", phase: Phase::Habilitation, eval: bid_guarantee },
    Evaluator { id: "rule-23", phase: Phase::Habilitation, eval: contract_guarantee },
    Evaluator { id: "rule-24", phase: Phase::Habilitation, eval: formalization },
    Evaluator { id: "rule-25", phase: Phase::Publication, eval: pncp_publication },
    Evaluator { id: "rule-26", phase: Phase::Publication, eval: pncp_deadline },
    Evaluator { id: "rule-27", phase: Phase::Publication, eval: appeal_deadline },
    Evaluator { id: "rule-28", phase: Phase::Budget, eval: confidential_budget },
    Evaluator { id: "rule-29", phase: Phase::Budget, eval: estimated_value },
    Evaluator { id: "rule-30", phase: Phase::Budget, eval: public_budget },
];

fn site_visit(fields: &FieldMap) -> Option<RuleOutcome> {
    if fields.is(Field::VisitaObrigatoria, "sim") {
        Some(
            RuleOutcome::ok(
                "rule-20",
                "Vistoria Prévia Obrigatória",
                "Vistoria prévia obrigatória - exige atestado",
                LEI_14133_ART_63,
            )
            .field(Field::VisitaObrigatoria)
            .reference("Item 8.1.3 do edital - DA HABILITAÇÃO"),
        )
    } else if fields.is(Field::Visita, "sim") && fields.is(Field::VisitaObrigatoria, "nao") {
        Some(
            RuleOutcome::ok(
                "rule-20",
                "Vistoria Prévia Facultativa",
                "Vistoria prévia facultativa - não exige atestado",
                LEI_14133_ART_63,
            )
            .field(Field::Visita)
            .reference("Item 8.1.2 do edital - DA HABILITAÇÃO"),
        )
    } else {
        None
    }
}

fn small_business_habilitation(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::PreferenciaMe, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-21",
            "Habilitação ME/EPP",
            "ME/EPP comprovam regularidade fiscal apenas para contratação",
            "LC 123/2006, Art. 43",
        )
        .guidance("Prazo de 5 dias úteis para regularização, prorrogável por igual período")
        .field(Field::PreferenciaMe)
        .reference("Item 8.15 do edital - DA HABILITAÇÃO"),
    )
}

/// Guarantee field as a requirement: `Some(None)` for a bare "sim",
/// `Some(Some(pct))` for a positive percentage, `None` otherwise.
fn guarantee_requirement(value: Option<&str>) -> Option<Option<f64>> {
    let value = value?.trim();
    if value.eq_ignore_ascii_case("sim") {
        return Some(None);
    }
    let percent = leading_decimal(value);
    (percent > 0.0).then_some(Some(percent))
}

fn bid_guarantee(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Garantia de Participação";
    let outcome = match guarantee_requirement(fields.get(Field::GarantiaParticipacao))? {
        None => RuleOutcome::ok(
            "rule-22",
            TITLE,
            "Garantia de participação exigida",
            "Art. 96, Lei 14.133/2021",
        ),
        Some(percent) if percent <= BID_GUARANTEE_CAP => RuleOutcome::ok(
            "rule-22",
            TITLE,
            format!("Garantia de participação de {percent}% exigida"),
            "Art. 58, Lei 14.133/2021",
        ),
        Some(percent) => RuleOutcome::warning(
            "rule-22",
            TITLE,
            format!("Garantia de participação de {percent}% acima do limite de 1%"),
            "Art. 58, Lei 14.133/2021",
        )
        .guidance("A garantia de proposta não pode exceder 1% do valor estimado da contratação"),
    };
    Some(
        outcome
            .field(Field::GarantiaParticipacao)
            .reference("Item da habilitação sobre garantias"),
    )
}

fn contract_guarantee(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Garantia Contratual";
    const LEGAL: &str = "Art. 98, Lei 14.133/2021";
    let outcome = match guarantee_requirement(fields.get(Field::GarantiaContratual))? {
        None => RuleOutcome::ok(
            "rule-23",
            TITLE,
            "Garantia contratual exigida",
            "Art. 96, Lei 14.133/2021",
        ),
        Some(percent) if percent <= CONTRACT_GUARANTEE_CAP => RuleOutcome::ok(
            "rule-23",
            TITLE,
            format!("Garantia contratual de {percent}% exigida"),
            LEGAL,
        ),
        Some(percent) if percent <= CONTRACT_GUARANTEE_JUSTIFIED_CAP => RuleOutcome::ok(
            "rule-23",
            TITLE,
            format!("Garantia contratual de {percent}% exigida"),
            LEGAL,
        )
        .guidance(
            "Percentual acima de 5% exige justificativa da complexidade técnica e dos riscos envolvidos (Art. 98, parágrafo único)",
        ),
        Some(percent) => RuleOutcome::warning(
            "rule-23",
            TITLE,
            format!("Garantia contratual de {percent}% acima do limite de 10%"),
            LEGAL,
        )
        .guidance("A garantia contratual não pode exceder 10% do valor inicial do contrato"),
    };
    Some(
        outcome
            .field(Field::GarantiaContratual)
            .reference("Item do contrato sobre garantias"),
    )
}

fn formalization(_fields: &FieldMap) -> Option<RuleOutcome> {
    Some(
        RuleOutcome::ok(
            "rule-24",
            "Formalização da Contratação",
            "Verifique instrumento de formalização no item 14.2.1",
            "Art. 95, Lei 14.133/2021",
        )
        .guidance("Deve ser escolhido: assinatura de Termo de Contrato ou emissão de nota de empenho")
        .reference("Item 14.2.1 do edital - DA FORMALIZAÇÃO"),
    )
}

fn pncp_publication(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Publicação no PNCP";
    const LEGAL: &str = "Art. 54, Lei 14.133/2021";
    let outcome = if fields.is(Field::PncpPublicacao, "sim") {
        RuleOutcome::ok("rule-25", TITLE, "Edital será publicado no PNCP", LEGAL)
    } else {
        RuleOutcome::warning("rule-25", TITLE, "Publicação no PNCP não identificada", LEGAL)
            .guidance("A publicação no PNCP é obrigatória")
    };
    Some(
        outcome
            .field(Field::PncpPublicacao)
            .reference("Requisito de publicação"),
    )
}

fn pncp_deadline(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Prazo de Publicação PNCP";
    const LEGAL: &str = "Art. 54, §1º, Lei 14.133/2021";
    if !fields.is(Field::PncpPublicacao, "sim") {
        return None;
    }
    let days = field_int(fields.get(Field::PncpPrazo));
    let outcome = if days >= PNCP_MIN_DAYS {
        RuleOutcome::ok("rule-26", TITLE, format!("Prazo de {days} dias adequado"), LEGAL)
    } else if days > 0 {
        RuleOutcome::warning(
            "rule-26",
            TITLE,
            format!("Prazo de {days} dias inferior ao mínimo de 8 dias úteis"),
            LEGAL,
        )
        .guidance("O prazo mínimo é de 8 dias úteis")
    } else {
        return None;
    };
    Some(outcome.field(Field::PncpPrazo).reference("Requisito de prazo"))
}

fn appeal_deadline(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Prazo Recursal";
    const LEGAL: &str = "Art. 165, Lei 14.133/2021";
    let days = field_int(fields.get(Field::PrazoRecursal));
    let outcome = if days >= APPEAL_MIN_DAYS {
        RuleOutcome::ok("rule-27", TITLE, format!("Prazo de {days} dias adequado"), LEGAL)
    } else if days > 0 {
        RuleOutcome::warning(
            "rule-27",
            TITLE,
            format!("Prazo de {days} dias inferior ao mínimo de 3 dias úteis"),
            LEGAL,
        )
        .guidance("O prazo mínimo é de 3 dias úteis")
    } else {
        return None;
    };
    Some(outcome.field(Field::PrazoRecursal).reference("Item sobre recursos"))
}

fn confidential_budget(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Orçamento Sigiloso";
    const LEGAL: &str = "Art. 24, §1º, Lei 14.133/2021";
    if !fields.is(Field::OrcamentoSigiloso, "sim") {
        return None;
    }
    let price_based = fields.is(Field::CriterioJulgamento, "menor-preco")
        || fields.is(Field::CriterioJulgamento, "maior-desconto");
    let outcome = if price_based {
        RuleOutcome::ok(
            "rule-28",
            TITLE,
            "Orçamento sigiloso permitido para o critério escolhido",
            LEGAL,
        )
    } else {
        RuleOutcome::warning("rule-28", TITLE, "Orçamento sigiloso em critério inadequado", LEGAL)
            .guidance("Orçamento sigiloso só é permitido em menor preço ou maior desconto")
    };
    Some(outcome.field(Field::OrcamentoSigiloso).reference(BUDGET_ITEM))
}

fn estimated_value(fields: &FieldMap) -> Option<RuleOutcome> {
    let value = fields.get(Field::ValorLicitacao)?;
    Some(
        RuleOutcome::ok(
            "rule-29",
            "Valor da Licitação",
            format!("Valor estimado: R$ {value}"),
            LEI_14133_ART_24,
        )
        .field(Field::ValorLicitacao)
        .reference("Capa do edital"),
    )
}

fn public_budget(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::OrcamentoPublico, "sim") || fields.is(Field::OrcamentoSigiloso, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-30",
            "Orçamento Público",
            "Orçamento estimado divulgado publicamente",
            LEI_14133_ART_24,
        )
        .field(Field::OrcamentoPublico)
        .reference(BUDGET_ITEM),
    )
}
