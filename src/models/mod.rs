// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Liste des modules:
//   - stock : Table des symboles suivis et leurs métriques de marché
//   - dto : Corps de requête / réponse de l'API
//   - health : Health check API
//
// Points d'attention:
//   - Une seule table ("stock"), créée au démarrage depuis l'entité SeaORM
//   - Les décimales sont sérialisées en nombres JSON
//
// ============================================================================

pub mod dto;
pub mod health;
pub mod stock;
