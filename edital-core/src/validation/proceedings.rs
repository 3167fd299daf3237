// Proposal, bidding and judgment (rule-11 .. rule-19). Several of these are
// standing reminders that fire on every edital.

use super::engine::{Evaluator, Phase};
use crate::types::{Field, FieldMap, RuleOutcome};

const LEI_14133_ART_56: &str = "Art. 56, Lei 14.133/2021";
const LEI_14133_ART_59: &str = "Art. 59, Lei 14.133/2021";
const LEI_14133_ART_63: &str = "Art. 63, Lei 14.133/2021";

pub(super) const EVALUATORS: &[Evaluator] = &[
    Evaluator { id: "rule-11", phase: Phase::Proposal, eval: binding_specifications },
    Evaluator { id: "rule-12", phase: Phase::Proposal, eval: smaller_quantity },
    Evaluator { id: "rule-13", phase: Phase::Bidding, eval: minimum_interval },
    Evaluator { id: "rule-14", phase: Phase::Bidding, eval: dispute_mode_items },
    Evaluator { id: "rule-15", phase: Phase::Bidding, eval: negotiation },
    Evaluator { id: "rule-16", phase: Phase::Judgment, eval: unfeasible_prices },
    Evaluator { id: "rule-17", phase: Phase::Judgment, eval: continuous_services },
    Evaluator { id: "rule-18", phase: Phase::Judgment, eval: samples },
    Evaluator { id: "rule-19", phase: Phase::Judgment, eval: proof_of_concept },
];

fn binding_specifications(_fields: &FieldMap) -> Option<RuleOutcome> {
    Some(
        RuleOutcome::ok(
            "rule-11",
            "Vinculação das Especificações",
            "Todas as especificações da proposta vinculam o licitante",
            LEI_14133_ART_63,
        )
        .reference("Item 5.2 do edital - DA PROPOSTA"),
    )
}

fn smaller_quantity(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::RegistroPreco, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-12",
            "Quantitativo Inferior (Registro de Preços)",
            "Verifique se o licitante pode oferecer quantitativo inferior ao máximo previsto",
            "Art. 82, Lei 14.133/2021",
        )
        .guidance(
            "Deve estar definido no item 5.2.1 se o licitante NÃO ou PODERÁ oferecer proposta em quantitativo inferior",
        )
        .field(Field::RegistroPreco)
        .reference("Item 5.2.1 do edital - DA PROPOSTA"),
    )
}

fn minimum_interval(fields: &FieldMap) -> Option<RuleOutcome> {
    const TITLE: &str = "Intervalo Mínimo entre Lances";
    let outcome = match fields.get(Field::IntervaloMinimo) {
        Some(interval) => RuleOutcome::ok(
            "rule-13",
            TITLE,
            format!("Intervalo mínimo definido: {interval}"),
            LEI_14133_ART_56,
        ),
        None => RuleOutcome::warning(
            "rule-13",
            TITLE,
            "Intervalo mínimo entre lances não identificado",
            LEI_14133_ART_56,
        )
        .guidance("Deve ser definido o intervalo mínimo de diferença entre lances"),
    };
    Some(
        outcome
            .field(Field::IntervaloMinimo)
            .reference("Item 6.8 do edital - DA ETAPA DE LANCES"),
    )
}

fn dispute_mode_items(fields: &FieldMap) -> Option<RuleOutcome> {
    let outcome = match fields.get(Field::ModoDisputa)? {
        "aberto" => RuleOutcome::ok(
            "rule-14",
            "Modo de Disputa Aberto",
            "Modo aberto - verifique redação do item 6.11",
            LEI_14133_ART_56,
        )
        .reference("Item 6.11 do edital - Modo Aberto"),
        "aberto-fechado" => RuleOutcome::ok(
            "rule-14",
            "Modo de Disputa Aberto e Fechado",
            "Modo aberto e fechado - verifique redação do item 6.12",
            LEI_14133_ART_56,
        )
        .reference("Item 6.12 do edital - Modo Aberto e Fechado"),
        "fechado-aberto" => RuleOutcome::ok(
            "rule-14",
            "Modo de Disputa Fechado e Aberto",
            "Modo fechado e aberto - verifique redação do item 6.13",
            LEI_14133_ART_56,
        )
        .guidance("Verifique se a descrição está coerente com o critério de julgamento")
        .reference("Item 6.13 do edital - Modo Fechado e Aberto"),
        _ => return None,
    };
    Some(outcome.field(Field::ModoDisputa))
}

fn negotiation(_fields: &FieldMap) -> Option<RuleOutcome> {
    Some(
        RuleOutcome::ok(
            "rule-15",
            "Negociação de Preços",
            "Verifique condição para negociação no item 6.22",
            LEI_14133_ART_59,
        )
        .guidance(
            "A condição deve ser ajustada ao critério: proposta acima do preço máximo ou inferior ao desconto mínimo",
        )
        .field(Field::CriterioJulgamento)
        .reference("Item 6.22 do edital - DA ETAPA DE LANCES"),
    )
}

fn unfeasible_prices(_fields: &FieldMap) -> Option<RuleOutcome> {
    Some(
        RuleOutcome::ok(
            "rule-16",
            "Inexequibilidade e Sobrepreço",
            "Verifique regra aplicável: geral (item 7.8) ou serviços de engenharia (item 7.9)",
            "Art. 59, §2º, Lei 14.133/2021",
        )
        .guidance(
            "Regra geral: inexequível se inferior a 50% do valor orçado. Engenharia: inferior a 75%",
        )
        .field(Field::CriterioJulgamento)
        .reference("Itens 7.8 ou 7.9 do edital - DO JULGAMENTO"),
    )
}

fn continuous_services(_fields: &FieldMap) -> Option<RuleOutcome> {
    Some(
        RuleOutcome::ok(
            "rule-17",
            "Serviços Contínuos",
            "Se aplicável, verifique item 7.10 sobre serviços contínuos",
            LEI_14133_ART_59,
        )
        .guidance("Deve indicar acordo/dissídio/convenção coletiva utilizada no cálculo (item 7.10.3)")
        .reference("Item 7.10 do edital - DO JULGAMENTO"),
    )
}

fn samples(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::Amostras, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-18",
            "Exigência de Amostras",
            "Amostras exigidas conforme Anexos",
            LEI_14133_ART_63,
        )
        .field(Field::Amostras)
        .reference("Item 7.15 do edital - DO JULGAMENTO"),
    )
}

fn proof_of_concept(fields: &FieldMap) -> Option<RuleOutcome> {
    if !fields.is(Field::Demonstracao, "sim") {
        return None;
    }
    Some(
        RuleOutcome::ok(
            "rule-19",
            "Prova de Conceito",
            "Prova de conceito exigida conforme Anexos",
            LEI_14133_ART_63,
        )
        .field(Field::Demonstracao)
        .reference("Item 7.16 do edital - DO JULGAMENTO"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminders_always_fire() {
        let empty = FieldMap::new();
        let reminders: [fn(&FieldMap) -> Option<RuleOutcome>; 4] =
            [binding_specifications, negotiation, unfeasible_prices, continuous_services];
        for eval in reminders {
            let outcome = eval(&empty).unwrap();
            assert!(!outcome.is_warning(), "{}", outcome.id);
        }
    }

    #[test]
    fn test_dispute_mode_item_reference() {
        let mut fields = FieldMap::new();
        fields.set(Field::ModoDisputa, "fechado-aberto");
        let outcome = dispute_mode_items(&fields).unwrap();
        assert_eq!(
            outcome.edital_reference.as_deref(),
            Some("Item 6.13 do edital - Modo Fechado e Aberto")
        );

        fields.set(Field::ModoDisputa, "fechado");
        assert!(dispute_mode_items(&fields).is_none());
    }

    #[test]
    fn test_missing_interval_warns() {
        assert!(minimum_interval(&FieldMap::new()).unwrap().is_warning());

        let mut fields = FieldMap::new();
        fields.set(Field::IntervaloMinimo, "R$ 0.50");
        let outcome = minimum_interval(&fields).unwrap();
        assert_eq!(outcome.message, "Intervalo mínimo definido: R$ 0.50");
    }
}
