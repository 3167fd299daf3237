// Initial criteria, price registration, participation and ME/EPP (rule-1 .. rule-10)

use super::engine::{Evaluator, Phase};
use super::numeric::field_int;
use crate::types::{Field, FieldMap, RuleOutcome};

const LEI_14133_ART_33: &str = "Art. 33, Lei 14.133/2021";
const LEI_14133_ART_56: &str = "Art. 56, Lei 14.133/2021";
const LEI_14133_ART_82: &str = "Art. 82, Lei 14.133/2021";
const COVER: &str = "Item do cabeçalho do edital";

pub(super) const EVALUATORS: &[Evaluator] = &[
    Evaluator { id: "rule-1", phase: Phase::InitialCriteria, eval: judgment_criterion },
    Evaluator { id: "rule-2", phase: Phase::InitialCriteria, eval: dispute_mode },
    Evaluator { id: "rule-3", phase: Phase::InitialCriteria, eval: small_business_preference },
    Evaluator { id: "rule-4", phase: Phase::PriceRegistration, eval: price_registration },
    Evaluator { id: "rule-5", phase: Phase::PriceRegistration, eval: pncp_intention },
    Evaluator { id: "rule-6", phase: Phase::PriceRegistration, eval: pncp_intention_deadline },
    Evaluator { id: "rule-7", phase: Phase::Participation, eval: cooperatives },
    Evaluator { id: "rule-8", phase: Phase::Participation, eval: consortium },
    Evaluator { id: "rule-9", phase: Phase::Participation, eval: exclusive_participation },
    Evaluator { id: "rule-10", phase: Phase::Participation, eval: reserved_quota },
];

fn judgment_criterion(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Critério de Julgamento";
    let outcome = match fields.get(Field::CriterioJulgamento) {
        Some(criterion) => RuleOutcome::ok(
            "rule-1",
            TITLE,
            format!("Critério definido: {criterion}"),
            LEI_14133_ART_33,
        ),
        None => RuleOutcome::warning(
            "rule-1",
            TITLE,
            "Critério de julgamento não identificado",
            LEI_14133_ART_33,
        )
        .guidance("Deve ser selecionado: menor preço ou maior desconto"),
    };
    Some(outcome.field(Field::CriterioJulgamento).reference(COVER))
}

fn dispute_mode(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Modo de Disputa";
    let outcome = match fields.get(Field::ModoDisputa) {
        Some(mode) => {
            RuleOutcome::ok("rule-2", TITLE, format!("Modo definido: {mode}"), LEI_14133_ART_56)
        }
        None => RuleOutcome::warning(
            "rule-2",
            TITLE,
            "Modo de disputa não identificado",
            LEI_14133_ART_56,
        )
        .guidance("Deve ser selecionado: aberto, aberto e fechado, ou fechado e aberto"),
    };
    Some(outcome.field(Field::ModoDisputa).reference(COVER))
}

fn small_business_preference(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Preferência ME/EPP";
    const LEGAL: &str = "LC 123/2006, Art. 44";
    let outcome = match fields.get(Field::PreferenciaMe)? {
        "sim" => RuleOutcome::ok(
            "rule-3",
            TITLE,
            "Tratamento diferenciado para ME/EPP previsto",
            LEGAL,
        ),
        "nao" => RuleOutcome::warning(
            "rule-3",
            TITLE,
            "Ausência de tratamento diferenciado para ME/EPP",
            LEGAL,
        )
        .guidance("Verifique se há justificativa legal para não aplicação"),
        _ => return None,
    };
    Some(outcome.field(Field::PreferenciaMe).reference(COVER))
}

fn price_registration(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Registro de Preços";
    let (message, reference) = match fields.get(Field::RegistroPreco)? {
        "sim" => (
            "Licitação para registro de preços",
            "Item 2 do edital - DO REGISTRO DE PREÇOS",
        ),
        "nao" => (
            "Licitação NÃO é para registro de preços",
            "Item 2.1 do edital - disciplina não se aplica",
        ),
        _ => return None,
    };
    Some(
        RuleOutcome::ok("rule-4", TITLE, message, LEI_14133_ART_82)
            .field(Field::RegistroPreco)
            .reference(reference),
    )
}

fn pncp_intention(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Intenção de Registro no PNCP";
    if !fields.is(Field::RegistroPreco, "sim") {
        return None;
    }
    let outcome = if fields.is(Field::PncpIntencao, "sim") {
        RuleOutcome::ok(
            "rule-5",
            TITLE,
            "Intenção de registro publicada no PNCP",
            LEI_14133_ART_82,
        )
    } else {
        RuleOutcome::warning(
            "rule-5",
            TITLE,
            "Registro de preços sem intenção publicada no PNCP",
            LEI_14133_ART_82,
        )
        .guidance("Deve haver publicação da intenção no PNCP com antecedência mínima de 8 dias")
    };
    Some(
        outcome
            .field(Field::PncpIntencao)
            .reference("Item 2.2 do edital - Registro de Preços"),
    )
}

fn pncp_intention_deadline(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Prazo Intenção PNCP";
    const LEGAL: &str = "Art. 82, §1º, Lei 14.133/2021";
    if !fields.is(Field::RegistroPreco, "sim") || !fields.is(Field::PncpIntencao, "sim") {
        return None;
    }
    let days = field_int(fields.get(Field::PncpPrazoIntencao));
    let outcome = if days >= 8 {
        RuleOutcome::ok("rule-6", TITLE, format!("Prazo de {days} dias adequado"), LEGAL)
    } else if days > 0 {
        RuleOutcome::warning(
            "rule-6",
            TITLE,
            format!("Prazo de {days} dias inferior ao mínimo de 8 dias"),
            LEGAL,
        )
        .guidance("O prazo deve ser de no mínimo 8 dias úteis")
    } else {
        return None;
    };
    Some(
        outcome
            .field(Field::PncpPrazoIntencao)
            .reference("Item 2.2 do edital - prazos"),
    )
}

fn cooperatives(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Participação de Cooperativas";
    const LEGAL: &str = "Art. 48, §3º, Lei 14.133/2021";
    let outcome = match fields.get(Field::Cooperativas)? {
        "vedado" => RuleOutcome::warning(
            "rule-7",
            TITLE,
            "Vedação à participação de cooperativas",
            LEGAL,
        )
        .guidance("Verifique se há justificativa técnica para vedação")
        .reference("Item 3.10 do edital - DA PARTICIPAÇÃO"),
        "permitido" => RuleOutcome::ok(
            "rule-7",
            TITLE,
            "Participação de cooperativas permitida",
            LEGAL,
        )
        .reference("Item 3.11 do edital - DA PARTICIPAÇÃO"),
        _ => return None,
    };
    Some(outcome.field(Field::Cooperativas))
}

fn consortium(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Participação de Consórcios";
    const LEGAL: &str = "Art. 15, Lei 14.133/2021";
    let outcome = match fields.get(Field::Consorcio)? {
        "vedado" => RuleOutcome::warning(
            "rule-8",
            TITLE,
            "Vedação à participação de consórcios",
            LEGAL,
        )
        .guidance("Verifique se há justificativa para vedação")
        .reference("Item 3.12 do edital - DA PARTICIPAÇÃO"),
        "permitido" => RuleOutcome::ok(
            "rule-8",
            TITLE,
            "Participação de consórcios permitida",
            LEGAL,
        )
        .guidance(
            "Verifique se há exigência de acréscimo de 10% a 30% na habilitação econômico-financeira (item 8.1.4.1)",
        )
        .reference("Item 3.13 do edital - DA PARTICIPAÇÃO"),
        _ => return None,
    };
    Some(outcome.field(Field::Consorcio))
}

fn exclusive_participation(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::ExclusivaMe, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-9",
            "Participação Exclusiva ME/EPP",
            "Itens com participação exclusiva de ME/EPP",
            "LC 123/2006, Art. 48, I",
        )
        .field(Field::ExclusivaMe)
        .reference("Item 3.5.1 do edital - Tratamento Favorecido"),
    )
}

fn reserved_quota(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Cota 25% ME/EPP";
    const LEGAL: &str = "LC 123/2006, Art. 48, III";
    let outcome = if fields.is(Field::Cota25Me, "sim") {
        RuleOutcome::ok("rule-10", TITLE, "Cota de até 25% reservada para ME/EPP", LEGAL)
            .reference("Item 3.5.2 do edital - Tratamento Favorecido")
    } else if fields.is(Field::Cota25Me, "nao") && fields.is(Field::PreferenciaMe, "sim") {
        RuleOutcome::warning("rule-10", TITLE, "Preferência ME/EPP sem cota de 25%", LEGAL)
            .guidance("Verifique a possibilidade de reserva de cota")
            .reference("Item 3.5 do edital - Tratamento Favorecido")
    } else {
        return None;
    };
    Some(outcome.field(Field::Cota25Me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleStatus;

    fn map(pairs: &[(Field, &str)]) -> FieldMap {
        pairs.iter().map(|&(field, value)| (field, value)).collect()
    }

    #[test]
    fn test_price_registration_both_values_are_ok() {
        let yes = price_registration(&map(&[(Field::RegistroPreco, "sim")])).unwrap();
        let no = price_registration(&map(&[(Field::RegistroPreco, "nao")])).unwrap();
        assert_eq!(yes.status, RuleStatus::Ok);
        assert_eq!(no.status, RuleStatus::Ok);
        assert_ne!(yes.message, no.message);
        assert_eq!(
            no.edital_reference.as_deref(),
            Some("Item 2.1 do edital - disciplina não se aplica")
        );
        assert!(price_registration(&FieldMap::new()).is_none());
    }

    #[test]
    fn test_intention_missing_warns_only_for_price_registration() {
        let outcome = pncp_intention(&map(&[(Field::RegistroPreco, "sim")])).unwrap();
        assert_eq!(outcome.status, RuleStatus::Warning);
        assert!(pncp_intention(&map(&[(Field::RegistroPreco, "nao")])).is_none());
    }

    #[test]
    fn test_vetoed_participation_warns() {
        let outcome = cooperatives(&map(&[(Field::Cooperativas, "vedado")])).unwrap();
        assert!(outcome.is_warning());
        let outcome = consortium(&map(&[(Field::Consorcio, "permitido")])).unwrap();
        assert!(!outcome.is_warning());
        assert!(outcome.guidance.unwrap().contains("10% a 30%"));
    }

    #[test]
    fn test_quota_warning_needs_preference() {
        assert!(reserved_quota(&map(&[(Field::Cota25Me, "nao")])).is_none());
        let outcome = reserved_quota(&map(&[
            (Field::Cota25Me, "nao"),
            (Field::PreferenciaMe, "sim"),
        ]))
        .unwrap();
        assert!(outcome.is_warning());
    }

    #[test]
    fn test_missing_criterion_warns_with_guidance() {
        let outcome = judgment_criterion(&FieldMap::new()).unwrap();
        assert!(outcome.is_warning());
        assert!(outcome.guidance.is_some());
        assert_eq!(outcome.field, Some(Field::CriterioJulgamento));
    }
}
