// Canned remediation plans, budgets and staffing per category, plus the
// solution generator that ties them to a scored complaint.
use crate::error::{Result, TriageError};
use crate::priority::{Priority, PriorityScorer, PriorityTier};
use crate::types::{Category, SolutionSummaryRow};
use crate::util::format_int;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Sum of every category budget, in COP.
pub const TOTAL_BUDGET: u64 = 1_400_000_000;

#[derive(Debug, Clone, Serialize)]
pub struct SolutionBundle {
    pub common_problems: &'static [&'static str],
    pub immediate: &'static [&'static str],
    pub medium_term: &'static [&'static str],
    pub budget: u64,
    pub implementation_time: &'static str,
    pub staffing: &'static [(&'static str, u32)],
    pub infrastructure: &'static [&'static str],
}

static SOLUTIONS: Lazy<HashMap<Category, SolutionBundle>> = Lazy::new(|| {
    HashMap::from([
        (
            Category::Health,
            SolutionBundle {
                common_problems: &[
                    "falta de médicos",
                    "hospital sin personal",
                    "centro de salud cerrado",
                    "no hay medicamentos",
                    "ambulancia no llega",
                    "urgencias colapsadas",
                ],
                immediate: &[
                    "Contratar médicos especialistas de forma urgente",
                    "Abrir turnos de 24 horas en centros de salud",
                    "Implementar sistema de telemedicina",
                    "Dotar de medicamentos esenciales",
                ],
                medium_term: &[
                    "Construir nuevos hospitales en zonas críticas",
                    "Capacitar personal sanitario local",
                    "Implementar sistema de citas digitales",
                    "Crear red de ambulancias municipales",
                ],
                budget: 500_000_000,
                implementation_time: "3-6 meses",
                staffing: &[("medicos", 50), ("enfermeros", 100), ("administrativos", 25)],
                infrastructure: &["hospitales", "centros_salud", "ambulancias"],
            },
        ),
        (
            Category::Education,
            SolutionBundle {
                common_problems: &[
                    "falta de profesores",
                    "escuela sin aulas",
                    "no hay materiales",
                    "colegio cerrado",
                    "profesores mal pagados",
                    "infraestructura deteriorada",
                ],
                immediate: &[
                    "Contratar docentes de forma masiva",
                    "Rehabilitar aulas existentes",
                    "Dotar de materiales educativos básicos",
                    "Implementar clases virtuales de emergencia",
                ],
                medium_term: &[
                    "Construir nuevas escuelas y colegios",
                    "Capacitar docentes en nuevas tecnologías",
                    "Implementar programa de alimentación escolar",
                    "Crear bibliotecas digitales municipales",
                ],
                budget: 300_000_000,
                implementation_time: "6-12 meses",
                staffing: &[("profesores", 200), ("coordinadores", 20), ("administrativos", 30)],
                infrastructure: &["escuelas", "colegios", "bibliotecas"],
            },
        ),
        (
            Category::Security,
            SolutionBundle {
                common_problems: &[
                    "delincuencia alta",
                    "policía no patrulla",
                    "calles oscuras",
                    "robos frecuentes",
                    "inseguridad nocturna",
                    "bandas delictivas",
                ],
                immediate: &[
                    "Aumentar patrullaje policial 24/7",
                    "Instalar cámaras de seguridad en puntos críticos",
                    "Mejorar iluminación pública",
                    "Implementar botones de pánico comunitarios",
                ],
                medium_term: &[
                    "Crear comisarías de barrio",
                    "Implementar sistema de videovigilancia inteligente",
                    "Programas de prevención comunitaria",
                    "Centros de rehabilitación para jóvenes",
                ],
                budget: 400_000_000,
                implementation_time: "2-4 meses",
                staffing: &[("policias", 80), ("vigilantes", 40), ("coordinadores", 15)],
                infrastructure: &["comisarias", "camaras", "vehiculos"],
            },
        ),
        (
            Category::Environment,
            SolutionBundle {
                common_problems: &[
                    "basura en las calles",
                    "recolección irregular",
                    "contaminación del río",
                    "aire contaminado",
                    "no hay reciclaje",
                    "vertederos ilegales",
                ],
                immediate: &[
                    "Aumentar frecuencia de recolección de basura",
                    "Implementar recolección selectiva",
                    "Limpiar puntos críticos de contaminación",
                    "Sancionar vertederos ilegales",
                ],
                medium_term: &[
                    "Crear plantas de reciclaje municipales",
                    "Implementar programa de compostaje comunitario",
                    "Reforestar áreas degradadas",
                    "Educación ambiental masiva",
                ],
                budget: 200_000_000,
                implementation_time: "4-8 meses",
                staffing: &[("recolectores", 60), ("supervisores", 20), ("educadores", 10)],
                infrastructure: &["plantas_reciclaje", "vehiculos_recoleccion", "centros_educacion"],
            },
        ),
    ])
});

pub fn bundle(category: Category) -> Result<&'static SolutionBundle> {
    SOLUTIONS
        .get(&category)
        .ok_or_else(|| TriageError::UnknownCategory(category.label().to_string()))
}

/// Staffing multiplier for a tier.
pub fn staffing_multiplier(tier: PriorityTier) -> f64 {
    match tier {
        PriorityTier::Critical => 1.5,
        PriorityTier::High => 1.2,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionPlan {
    pub category: Category,
    pub tier: PriorityTier,
    /// Immediate actions for critical/high tiers, medium-term otherwise.
    pub apply_now: &'static [&'static str],
    pub immediate: &'static [&'static str],
    pub medium_term: &'static [&'static str],
    pub budget: u64,
    pub implementation_time: &'static str,
    pub staffing: Vec<(&'static str, u32)>,
    pub infrastructure: &'static [&'static str],
    pub multiplier: f64,
}

/// Look up the canned plan for `category` and scale its staffing by tier.
pub fn lookup(category: Category, tier: PriorityTier) -> Result<SolutionPlan> {
    let b = bundle(category)?;
    let multiplier = staffing_multiplier(tier);
    let staffing = b
        .staffing
        .iter()
        .map(|(role, n)| (*role, (*n as f64 * multiplier) as u32))
        .collect();
    Ok(SolutionPlan {
        category,
        tier,
        apply_now: if tier.is_pressing() { b.immediate } else { b.medium_term },
        immediate: b.immediate,
        medium_term: b.medium_term,
        budget: b.budget,
        implementation_time: b.implementation_time,
        staffing,
        infrastructure: b.infrastructure,
        multiplier,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionPhase {
    pub name: &'static str,
    pub window: &'static str,
    pub actions: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionPlan {
    pub phases: &'static [ActionPhase],
    pub general_coordinator: &'static str,
    pub technical_coordinator: String,
    pub field_supervisor: &'static str,
    pub evaluator: &'static str,
}

const PHASES: &[ActionPhase] = &[
    ActionPhase {
        name: "Fase 1 inmediata",
        window: "0-48 horas",
        actions: &[
            "Evaluación de la situación actual",
            "Asignación de recursos de emergencia",
            "Comunicación con autoridades locales",
            "Implementación de medidas temporales",
        ],
    },
    ActionPhase {
        name: "Fase 2 corto plazo",
        window: "1-4 semanas",
        actions: &[
            "Contratación de personal especializado",
            "Adquisición de equipos necesarios",
            "Capacitación del personal",
            "Implementación de soluciones inmediatas",
        ],
    },
    ActionPhase {
        name: "Fase 3 mediano plazo",
        window: "1-6 meses",
        actions: &[
            "Construcción de infraestructura",
            "Implementación de programas permanentes",
            "Monitoreo y evaluación continua",
            "Ajustes basados en resultados",
        ],
    },
];

pub fn action_plan(category: Category) -> ActionPlan {
    ActionPlan {
        phases: PHASES,
        general_coordinator: "Alcaldía Municipal",
        technical_coordinator: format!("Secretaría de {}", category.label()),
        field_supervisor: "Funcionario designado",
        evaluator: "Comité ciudadano",
    }
}

/// Full analysis of one complaint.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemAnalysis {
    pub comment: String,
    pub category: Category,
    pub city: String,
    pub priority: Priority,
    pub plan: SolutionPlan,
    pub actions: ActionPlan,
}

#[derive(Debug, Clone, Default)]
pub struct SolutionGenerator {
    scorer: PriorityScorer,
}

impl SolutionGenerator {
    /// Analyze a complaint given the labels as they appear in the CSV.
    pub fn analyze(&self, comment: &str, category: &str, urgency: &str, city: &str) -> Result<ProblemAnalysis> {
        let priority = self.scorer.score_labels(category, urgency, city)?;
        let category: Category = category.parse()?;
        let plan = lookup(category, priority.tier)?;
        debug!(%category, tier = %priority.tier, score = priority.score, "analyzed problem");
        Ok(ProblemAnalysis {
            comment: comment.to_string(),
            category,
            city: city.trim().to_string(),
            priority,
            plan,
            actions: action_plan(category),
        })
    }
}

/// Per-category totals over a batch of analyses, in category order. Budgets
/// add up once per analyzed problem.
pub fn summarize_analyses(analyses: &[ProblemAnalysis]) -> Vec<SolutionSummaryRow> {
    Category::ALL
        .iter()
        .filter_map(|&c| {
            let of_cat: Vec<&ProblemAnalysis> = analyses.iter().filter(|a| a.category == c).collect();
            if of_cat.is_empty() {
                return None;
            }
            let budget: u64 = of_cat.iter().map(|a| a.plan.budget).sum();
            Some(SolutionSummaryRow {
                category: c.label().to_string(),
                problems: of_cat.len(),
                critical: of_cat.iter().filter(|a| a.priority.tier.is_pressing()).count(),
                budget: format_int(budget),
            })
        })
        .collect()
}

pub fn total_budget(analyses: &[ProblemAnalysis]) -> u64 {
    analyses.iter().map(|a| a.plan.budget).sum()
}

/// The four demonstration complaints, one per category.
pub const DEMO_PROBLEMS: &[(&str, &str, &str, &str)] = &[
    (
        "necesitamos más médicos en el hospital, hay mucha gente esperando",
        "Salud",
        "Urgente",
        "Bogotá",
    ),
    (
        "no hay suficientes profesores en la escuela del barrio",
        "Educación",
        "No urgente",
        "Medellín",
    ),
    (
        "hay mucha delincuencia en el barrio, necesitamos más policía",
        "Seguridad",
        "Urgente",
        "Manizales",
    ),
    (
        "las calles están llenas de basura, no recogen los desechos",
        "Medio Ambiente",
        "No urgente",
        "Cali",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_add_up_to_the_total() {
        let sum: u64 = Category::ALL.iter().map(|c| bundle(*c).unwrap().budget).sum();
        assert_eq!(sum, TOTAL_BUDGET);
    }

    #[test]
    fn staffing_scales_with_tier_and_truncates() {
        let critical = lookup(Category::Security, PriorityTier::Critical).unwrap();
        assert_eq!(critical.staffing, vec![("policias", 120), ("vigilantes", 60), ("coordinadores", 22)]);
        let high = lookup(Category::Health, PriorityTier::High).unwrap();
        assert_eq!(high.staffing, vec![("medicos", 60), ("enfermeros", 120), ("administrativos", 30)]);
        let low = lookup(Category::Environment, PriorityTier::Low).unwrap();
        assert_eq!(low.multiplier, 1.0);
        assert_eq!(low.staffing[0], ("recolectores", 60));
    }

    #[test]
    fn pressing_tiers_apply_immediate_actions() {
        let high = lookup(Category::Education, PriorityTier::High).unwrap();
        assert_eq!(high.apply_now, high.immediate);
        let medium = lookup(Category::Education, PriorityTier::Medium).unwrap();
        assert_eq!(medium.apply_now, medium.medium_term);
    }

    #[test]
    fn analyze_demo_problems() {
        let g = SolutionGenerator::default();
        let analyses: Vec<ProblemAnalysis> = DEMO_PROBLEMS
            .iter()
            .map(|(c, cat, u, city)| g.analyze(c, cat, u, city).unwrap())
            .collect();
        let tiers: Vec<PriorityTier> = analyses.iter().map(|a| a.priority.tier).collect();
        assert_eq!(
            tiers,
            vec![
                PriorityTier::Critical,
                PriorityTier::Critical,
                PriorityTier::Critical,
                PriorityTier::High
            ]
        );
        assert_eq!(analyses[0].actions.technical_coordinator, "Secretaría de Salud");
        assert_eq!(total_budget(&analyses), TOTAL_BUDGET);

        let rows = summarize_analyses(&analyses);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].budget, "500,000,000");
        assert_eq!(rows.iter().map(|r| r.critical).sum::<usize>(), 4);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let g = SolutionGenerator::default();
        let err = g.analyze("x", "Transporte", "Urgente", "Cali").unwrap_err();
        assert!(matches!(err, TriageError::UnknownCategory(_)));
        let err = g.analyze("x", "Salud", "pronto", "Cali").unwrap_err();
        assert!(matches!(err, TriageError::UnknownUrgency(_)));
    }
}
